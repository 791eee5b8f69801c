//! The closed set of ontology operations and their per-call generation knobs.

use crate::error::OperationError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Confidence above which merge alignments are unified under a single id.
pub const MERGE_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// One of the six algebraic operations over ontologies.
///
/// Parsed once at the boundary; everything downstream matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Disjoint union, no alignment.
    Addition,
    /// Set difference A \ B.
    Subtraction,
    /// Alignment-based union with conflict resolution.
    Merge,
    /// Connection through an interface.
    Composition,
    /// Inverse problem: reconstruct the unknown component.
    Division,
    /// Re-express A in the schema of B.
    Transformation,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Addition,
        OperationKind::Subtraction,
        OperationKind::Merge,
        OperationKind::Composition,
        OperationKind::Division,
        OperationKind::Transformation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Addition => "addition",
            OperationKind::Subtraction => "subtraction",
            OperationKind::Merge => "merge",
            OperationKind::Composition => "composition",
            OperationKind::Division => "division",
            OperationKind::Transformation => "transformation",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            OperationKind::Addition => "Addition (Sum)",
            OperationKind::Subtraction => "Subtraction (Difference)",
            OperationKind::Merge => "Merge (Alignment-based Union)",
            OperationKind::Composition => "Composition (Interface-based Connection)",
            OperationKind::Division => "Division (Inverse/Decomposition)",
            OperationKind::Transformation => "Transformation (Schema Mapping)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            OperationKind::Addition => {
                "Simple union of two ontologies without considering alignments"
            }
            OperationKind::Subtraction => "Remove components of ontology B from ontology A",
            OperationKind::Merge => {
                "Merge two ontologies by identifying alignments and resolving conflicts"
            }
            OperationKind::Composition => {
                "Compose two ontologies by connecting through a shared interface"
            }
            OperationKind::Division => {
                "Given a merged ontology and one component, reconstruct the missing component"
            }
            OperationKind::Transformation => {
                "Re-express a source ontology in the vocabulary of a target schema"
            }
        }
    }

    /// Names of the two ontology operands, as reported in arity errors.
    pub fn operand_labels(self) -> (&'static str, &'static str) {
        match self {
            OperationKind::Division => ("ontologyFull", "ontologyKnown"),
            OperationKind::Addition
            | OperationKind::Subtraction
            | OperationKind::Merge
            | OperationKind::Composition
            | OperationKind::Transformation => ("ontologyA", "ontologyB"),
        }
    }

    /// The optional third input, if this kind takes one.
    pub fn auxiliary(self) -> Option<AuxiliaryKind> {
        match self {
            OperationKind::Composition => Some(AuxiliaryKind::InterfaceSpec),
            OperationKind::Transformation => Some(AuxiliaryKind::MappingRules),
            OperationKind::Addition
            | OperationKind::Subtraction
            | OperationKind::Merge
            | OperationKind::Division => None,
        }
    }

    pub fn info(self) -> OperationInfo {
        OperationInfo {
            id: self,
            name: self.display_name(),
            description: self.description(),
        }
    }

    /// Every operation with its display name and description, in declaration order.
    pub fn catalog() -> Vec<OperationInfo> {
        Self::ALL.iter().map(|k| k.info()).collect()
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| OperationError::UnknownOperation {
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationInfo {
    pub id: OperationKind,
    pub name: &'static str,
    pub description: &'static str,
}

/// Optional third input of composition and transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryKind {
    InterfaceSpec,
    MappingRules,
}

impl AuxiliaryKind {
    /// Request field carrying this input.
    pub fn field_name(self) -> &'static str {
        match self {
            AuxiliaryKind::InterfaceSpec => "interface",
            AuxiliaryKind::MappingRules => "mappingRules",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            AuxiliaryKind::InterfaceSpec => "Interface Specification",
            AuxiliaryKind::MappingRules => "Mapping Rules",
        }
    }

    /// Directive substituted when the caller supplies nothing.
    pub fn default_directive(self) -> Value {
        match self {
            AuxiliaryKind::InterfaceSpec => {
                json!({ "description": "Auto-detect compatible interfaces" })
            }
            AuxiliaryKind::MappingRules => {
                json!({ "description": "Infer mappings from source to target schema" })
            }
        }
    }
}

/// Per-call sampling parameters forwarded to the collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}
