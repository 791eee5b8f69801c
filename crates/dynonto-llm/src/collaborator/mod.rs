//! Collaborators: the external text-generation services that perform the
//! semantic work of an operation.
//!
//! A collaborator receives a rendered prompt and returns free-form text. It
//! knows nothing about ontologies; recovering and checking structure is the
//! dispatcher's job.

use crate::extract::extract;
use crate::operation::GenerationOptions;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

mod config;
mod mock;

#[cfg(feature = "anthropic")]
mod anthropic;
#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicCollaborator;
pub use config::{
    CollaboratorConfig, ConfigError, Provider, ANTHROPIC_VERSION, DEFAULT_TIMEOUT_SECS,
    ENV_API_KEY, ENV_BASE_URL, ENV_MODEL, ENV_PROVIDER, ENV_TIMEOUT_SECS,
};
pub use mock::MockCollaborator;
#[cfg(feature = "openai")]
pub use openai::OpenAiCollaborator;

pub const SYSTEM_PROMPT: &str = "You are an expert in ontology engineering and formal knowledge representation. Always respond with valid JSON following the specified schema.";

pub const CONNECTION_TEST_PROMPT: &str =
    r#"Respond with valid JSON: {"status": "ok", "message": "test successful"}"#;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CollaboratorError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollaboratorInfo {
    pub provider: String,
    pub model: String,
}

#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Send `prompt` and return the raw response text.
    async fn execute(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CollaboratorError>;

    fn info(&self) -> CollaboratorInfo;

    /// Round-trip a trivial JSON request. Any failure reads as "not connected".
    async fn test_connection(&self) -> bool {
        match self
            .execute(CONNECTION_TEST_PROMPT, &GenerationOptions::default())
            .await
        {
            Ok(text) => extract(&text)
                .map(|e| e.value.get("status").and_then(|s| s.as_str()) == Some("ok"))
                .unwrap_or(false),
            Err(err) => {
                tracing::warn!(error = %err, "collaborator connection test failed");
                false
            }
        }
    }
}

/// Build the collaborator selected by `config`.
///
/// Returns `Ok(None)` when no credential is configured, which callers treat
/// as offline mode.
pub fn from_config(config: &CollaboratorConfig) -> Result<Option<Arc<dyn Collaborator>>, ConfigError> {
    let Some(api_key) = config.credential() else {
        return Ok(None);
    };
    let api_key = api_key.to_string();

    let collaborator: Arc<dyn Collaborator> = match config.provider {
        #[cfg(feature = "openai")]
        Provider::OpenAi => Arc::new(OpenAiCollaborator::new(config.clone(), api_key)?),
        #[cfg(feature = "anthropic")]
        Provider::Anthropic => Arc::new(AnthropicCollaborator::new(config.clone(), api_key)?),
        #[allow(unreachable_patterns)]
        other => {
            let _ = api_key;
            return Err(ConfigError::ProviderDisabled(other));
        }
    };
    Ok(Some(collaborator))
}

#[cfg(any(feature = "openai", feature = "anthropic"))]
pub(crate) fn http_client(config: &CollaboratorConfig) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ConfigError::Client(e.to_string()))
}

#[cfg(any(feature = "openai", feature = "anthropic"))]
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Milliseconds to wait from a `retry-after` header given in seconds.
/// Absent or unparseable headers fall back to one minute.
#[cfg(any(feature = "openai", feature = "anthropic"))]
pub(crate) fn retry_after_ms(header: Option<&str>) -> u64 {
    header
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
        .saturating_mul(1000)
}

/// Map a non-success HTTP response to a collaborator error.
#[cfg(any(feature = "openai", feature = "anthropic"))]
pub(crate) async fn error_from_response(
    provider: &'static str,
    response: reqwest::Response,
) -> CollaboratorError {
    let status = response.status();
    if status.as_u16() == 429 {
        let header = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok());
        return CollaboratorError::RateLimited {
            retry_after_ms: retry_after_ms(header),
        };
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    CollaboratorError::Api {
        provider,
        status: status.as_u16(),
        message,
    }
}
