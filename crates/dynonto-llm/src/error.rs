use crate::collaborator::CollaboratorError;
use crate::extract::ExtractionError;
use crate::operation::OperationKind;
use thiserror::Error;

/// Failures of a single operation invocation.
///
/// Structural problems in the recovered ontology are not errors; they are
/// attached to the outcome as a validation report.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(
        "unknown operation: {name} (expected one of addition, subtraction, merge, composition, division, transformation)"
    )]
    UnknownOperation { name: String },

    #[error("{operand} is required for the {operation} operation")]
    MissingOperand {
        operation: OperationKind,
        operand: &'static str,
    },

    #[error("collaborator call failed: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("operation cancelled while waiting for the collaborator")]
    Cancelled,
}

impl OperationError {
    /// Whether the caller sent a bad request, as opposed to a downstream failure.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            OperationError::UnknownOperation { .. } | OperationError::MissingOperand { .. }
        )
    }
}
