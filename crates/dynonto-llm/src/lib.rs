//! Dynonto LLM: ontology operations delegated to an external collaborator
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │                        OPERATION PIPELINE                              │
//! ├────────────────────────────────────────────────────────────────────────┤
//! │                                                                        │
//! │  caller ──► CheckArity ──► BuildContract ──► InvokeCollaborator        │
//! │                                                   │                    │
//! │                                     ┌─────────────┴─────────────┐      │
//! │                                     │ credential?               │      │
//! │                                     ▼ yes                  no ▼      │
//! │                              ┌─────────────┐        ┌──────────────┐   │
//! │                              │ OpenAI /    │        │ offline      │   │
//! │                              │ Anthropic   │        │ canned table │   │
//! │                              └──────┬──────┘        └──────┬───────┘   │
//! │                                     └─────────┬────────────┘           │
//! │                                               ▼                        │
//! │                         ExtractResult (whole ▸ fenced ▸ braces)        │
//! │                                               │                        │
//! │                                               ▼                        │
//! │                 ValidateResult (diagnostics attached, never fatal)     │
//! │                                               │                        │
//! │  caller ◄─────────────────────────────────────┘                        │
//! │                                                                        │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The collaborator does the semantic work (alignment, conflict resolution,
//! domain mapping). This crate defines what it is asked, what it must answer,
//! and how its free-form answer is recovered and checked.

pub mod collaborator;
pub mod contract;
pub mod digest;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod offline;
pub mod operation;
pub mod request;
pub mod schema;

pub use collaborator::{
    Collaborator, CollaboratorConfig, CollaboratorError, CollaboratorInfo, ConfigError,
    MockCollaborator, Provider,
};
pub use contract::{build_contract, OperationContract};
pub use dispatch::{ConnectionStatus, OperationDispatcher, OperationOutcome, RenderedContract};
pub use error::OperationError;
pub use extract::{extract, Extraction, ExtractionError, ExtractionStrategy};
pub use operation::{AuxiliaryKind, GenerationOptions, OperationInfo, OperationKind};
pub use request::{OperationRequest, RawOperationRequest};
pub use schema::OutputSchema;
