//! Operation dispatch.
//!
//! ```text
//! ReceiveRequest → CheckArity → BuildContract → InvokeCollaborator
//!                → ExtractResult → ValidateResult → ReturnResponse
//! ```
//!
//! Each invocation is independent. The dispatcher holds no mutable state, so a
//! single instance can serve concurrent requests behind an `Arc`.

use crate::collaborator::{
    self, Collaborator, CollaboratorConfig, CollaboratorInfo, ConfigError,
};
use crate::contract::{build_contract, OperationContract, OperationInputs};
use crate::error::OperationError;
use crate::extract::{extract, ExtractionStrategy};
use crate::offline;
use crate::operation::OperationKind;
use crate::request::OperationRequest;
use dynonto_model::{validate_value, OntologySummary, ValidationReport};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

/// Result of one successful operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    pub kind: OperationKind,
    /// The recovered collaborator document, with a `validation` diagnostic
    /// attached when the embedded result ontology is structurally invalid.
    pub payload: Value,
    pub validation: Option<ValidationReport>,
    /// Required output paths that were missing or out of range.
    pub contract_gaps: Vec<String>,
    pub strategy: ExtractionStrategy,
    pub offline: bool,
    pub digest: String,
}

impl OperationOutcome {
    pub fn result(&self) -> Option<&Value> {
        self.payload.get("result").filter(|v| !v.is_null())
    }

    pub fn is_structurally_valid(&self) -> bool {
        self.validation.is_none()
    }
}

/// Contract preview plus a compact description of the inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedContract {
    #[serde(flatten)]
    pub contract: OperationContract,
    pub input_summary: InputSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSummary {
    pub ontology_a: Option<OntologySummary>,
    pub ontology_b: Option<OntologySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    pub provider: String,
    pub model: String,
    pub has_api_key: bool,
}

pub struct OperationDispatcher {
    collaborator: Option<Arc<dyn Collaborator>>,
    offline_info: CollaboratorInfo,
}

impl OperationDispatcher {
    pub fn new(collaborator: Arc<dyn Collaborator>) -> Self {
        let offline_info = collaborator.info();
        Self {
            collaborator: Some(collaborator),
            offline_info,
        }
    }

    /// Dispatcher that always answers from the canned table.
    pub fn offline() -> Self {
        let defaults = CollaboratorConfig::default();
        Self {
            collaborator: None,
            offline_info: CollaboratorInfo {
                provider: defaults.provider.as_str().to_string(),
                model: defaults.model,
            },
        }
    }

    /// Bind the collaborator `config` selects, or go offline without a credential.
    pub fn from_config(config: &CollaboratorConfig) -> Result<Self, ConfigError> {
        let offline_info = CollaboratorInfo {
            provider: config.provider.as_str().to_string(),
            model: config.model.clone(),
        };
        Ok(Self {
            collaborator: collaborator::from_config(config)?,
            offline_info,
        })
    }

    pub fn is_offline(&self) -> bool {
        self.collaborator.is_none()
    }

    pub fn info(&self) -> CollaboratorInfo {
        match &self.collaborator {
            Some(c) => c.info(),
            None => self.offline_info.clone(),
        }
    }

    /// Build the contract without invoking anything.
    pub fn render(&self, request: &OperationRequest) -> Result<RenderedContract, OperationError> {
        let contract = build_contract(&OperationInputs::from(request))?;
        Ok(RenderedContract {
            contract,
            input_summary: InputSummary {
                ontology_a: request.ontology_a.as_ref().map(|o| o.summary()),
                ontology_b: request.ontology_b.as_ref().map(|o| o.summary()),
            },
        })
    }

    pub async fn dispatch(
        &self,
        request: &OperationRequest,
    ) -> Result<OperationOutcome, OperationError> {
        self.dispatch_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Run one operation. Cancelling `cancel` while the collaborator call is
    /// in flight drops that call and yields [`OperationError::Cancelled`].
    pub async fn dispatch_with_cancellation(
        &self,
        request: &OperationRequest,
        cancel: &CancellationToken,
    ) -> Result<OperationOutcome, OperationError> {
        let span = tracing::info_span!("dispatch", operation = %request.kind);
        self.run(request, cancel).instrument(span).await
    }

    async fn run(
        &self,
        request: &OperationRequest,
        cancel: &CancellationToken,
    ) -> Result<OperationOutcome, OperationError> {
        debug!(stage = "build_contract");
        let contract = build_contract(&OperationInputs::from(request))?;

        debug!(stage = "invoke_collaborator", digest = %contract.digest);
        let (text, offline) = match &self.collaborator {
            Some(collaborator) => {
                let info = collaborator.info();
                info!(
                    provider = %info.provider,
                    model = %info.model,
                    digest = %contract.digest,
                    "invoking collaborator"
                );
                let text = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        warn!("operation cancelled during collaborator call");
                        return Err(OperationError::Cancelled);
                    }
                    response = collaborator.execute(&contract.prompt, &request.options) => response?,
                };
                (text, false)
            }
            None => {
                warn!("no collaborator credential configured, using offline canned response");
                (offline::canned_text(request.kind), true)
            }
        };

        debug!(stage = "extract_result", bytes = text.len());
        let extraction = extract(&text)?;
        let mut payload = extraction.value;

        let schema = contract.schema();
        let mut contract_gaps: Vec<String> = schema
            .missing_paths(&payload)
            .into_iter()
            .map(|path| format!("missing required output {path}"))
            .collect();
        contract_gaps.extend(schema.range_issues(&payload));
        if !contract_gaps.is_empty() {
            warn!(gaps = ?contract_gaps, "collaborator output does not fully satisfy the contract");
        }

        debug!(stage = "validate_result");
        let validation = payload
            .get("result")
            .filter(|v| !v.is_null())
            .map(validate_value)
            .filter(|report| !report.valid);
        if let Some(report) = &validation {
            warn!(errors = ?report.errors, "collaborator produced an invalid ontology");
            attach_validation(&mut payload, report);
        }

        Ok(OperationOutcome {
            kind: request.kind,
            payload,
            validation,
            contract_gaps,
            strategy: extraction.strategy,
            offline,
            digest: contract.digest,
        })
    }

    /// Test the collaborator connection. Offline mode always reports connected.
    pub async fn connection_status(&self) -> ConnectionStatus {
        let info = self.info();
        let (connected, has_api_key) = match &self.collaborator {
            Some(collaborator) => (collaborator.test_connection().await, true),
            None => (true, false),
        };
        ConnectionStatus {
            connected,
            provider: info.provider,
            model: info.model,
            has_api_key,
        }
    }
}

/// Put the report under `validation`, merging into an existing object so
/// division's own self-check fields survive.
fn attach_validation(payload: &mut Value, report: &ValidationReport) {
    let Some(doc) = payload.as_object_mut() else {
        return;
    };
    match doc.get_mut("validation").and_then(Value::as_object_mut) {
        Some(existing) => {
            existing.insert("valid".to_string(), Value::Bool(report.valid));
            existing.insert(
                "errors".to_string(),
                Value::from(report.errors.clone()),
            );
        }
        None => {
            doc.insert("validation".to_string(), report.to_value());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attach_merges_into_existing_validation_object() {
        let mut payload = json!({
            "result": {},
            "validation": {"compositionCheck": "close", "discrepancies": []}
        });
        let report = ValidationReport::from_errors(vec!["Ontology must have an id".into()]);
        attach_validation(&mut payload, &report);
        assert_eq!(
            payload["validation"],
            json!({
                "compositionCheck": "close",
                "discrepancies": [],
                "valid": false,
                "errors": ["Ontology must have an id"]
            })
        );
    }

    #[test]
    fn attach_replaces_non_object_validation() {
        let mut payload = json!({"result": {}, "validation": "looks fine"});
        let report = ValidationReport::from_errors(vec!["Ontology must have a name".into()]);
        attach_validation(&mut payload, &report);
        assert_eq!(payload["validation"]["valid"], false);
    }

    #[test]
    fn offline_dispatcher_reports_default_provider() {
        let dispatcher = OperationDispatcher::offline();
        assert!(dispatcher.is_offline());
        assert_eq!(dispatcher.info().provider, "openai");
    }
}
