//! Operation requests: the wire shape callers send and its validated form.

use crate::error::OperationError;
use crate::operation::{AuxiliaryKind, GenerationOptions, OperationKind};
use dynonto_model::Ontology;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request as it arrives over JSON. The operation tag is still a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperationRequest {
    pub operation: String,
    #[serde(default, alias = "ontologyFull", skip_serializing_if = "Option::is_none")]
    pub ontology_a: Option<Ontology>,
    #[serde(default, alias = "ontologyKnown", skip_serializing_if = "Option::is_none")]
    pub ontology_b: Option<Ontology>,
    #[serde(default, rename = "interface", skip_serializing_if = "Option::is_none")]
    pub interface_spec: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_rules: Option<Value>,
    #[serde(default)]
    pub options: GenerationOptions,
}

impl RawOperationRequest {
    /// Resolve the operation tag. Unknown tags are rejected here, before any
    /// contract is built. The auxiliary field that does not belong to the
    /// resolved kind is dropped.
    pub fn into_request(self) -> Result<OperationRequest, OperationError> {
        let kind: OperationKind = self.operation.trim().parse()?;
        let auxiliary = match kind.auxiliary() {
            Some(AuxiliaryKind::InterfaceSpec) => self.interface_spec,
            Some(AuxiliaryKind::MappingRules) => self.mapping_rules,
            None => None,
        };
        Ok(OperationRequest {
            kind,
            ontology_a: self.ontology_a,
            ontology_b: self.ontology_b,
            auxiliary,
            options: self.options,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub ontology_a: Option<Ontology>,
    pub ontology_b: Option<Ontology>,
    pub auxiliary: Option<Value>,
    pub options: GenerationOptions,
}

impl OperationRequest {
    pub fn new(kind: OperationKind, a: Ontology, b: Ontology) -> Self {
        Self {
            kind,
            ontology_a: Some(a),
            ontology_b: Some(b),
            auxiliary: None,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_auxiliary(mut self, auxiliary: Value) -> Self {
        self.auxiliary = Some(auxiliary);
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}
