//! Recover a structured JSON object from free-form collaborator text.
//!
//! Collaborators are asked for bare JSON but routinely wrap it in prose or a
//! markdown fence. Strategies are tried in order and the first one that
//! yields a JSON *object* wins. Arrays and scalars never count.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// The whole (trimmed) text is a JSON object.
    WholeDocument,
    /// The first ```` ```json ```` fenced block is a JSON object.
    FencedBlock,
    /// Greedy span from the first `{` to the last `}`.
    BraceSpan,
}

impl ExtractionStrategy {
    pub const ORDER: [ExtractionStrategy; 3] = [
        ExtractionStrategy::WholeDocument,
        ExtractionStrategy::FencedBlock,
        ExtractionStrategy::BraceSpan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionStrategy::WholeDocument => "whole-document",
            ExtractionStrategy::FencedBlock => "fenced-block",
            ExtractionStrategy::BraceSpan => "brace-span",
        }
    }

    pub fn attempt(self, text: &str) -> Option<Value> {
        match self {
            ExtractionStrategy::WholeDocument => parse_object(text.trim()),
            ExtractionStrategy::FencedBlock => fenced_block_regex()
                .captures(text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| parse_object(m.as_str())),
            ExtractionStrategy::BraceSpan => brace_span_regex()
                .find(text)
                .and_then(|m| parse_object(m.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub value: Value,
    pub strategy: ExtractionStrategy,
}

#[derive(Debug, Clone, Error)]
#[error("could not extract a JSON object from the collaborator response ({} bytes)", raw.len())]
pub struct ExtractionError {
    pub raw: String,
}

pub fn extract(text: &str) -> Result<Extraction, ExtractionError> {
    ExtractionStrategy::ORDER
        .iter()
        .find_map(|strategy| {
            strategy.attempt(text).map(|value| Extraction {
                value,
                strategy: *strategy,
            })
        })
        .ok_or_else(|| ExtractionError {
            raw: text.to_string(),
        })
}

fn parse_object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

fn fenced_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```json\r?\n(.*?)\r?\n```").expect("fenced block pattern is valid")
    })
}

fn brace_span_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("brace span pattern is valid"))
}
