//! Dynonto model: the dynamic ontology O = (C, R, A, I, Σ)
//!
//! This crate owns everything about an ontology value that can be decided
//! without talking to a collaborator:
//!
//! - the data model (`ontology`): classes, relations, axioms, instances and the
//!   schema-free vocabulary / metadata bags,
//! - structural validation (`validate`), over typed values *and* over raw JSON
//!   coming back from an untrusted collaborator,
//! - a deterministic one-way Turtle projection (`turtle`),
//! - the reference ontologies used by demos and tests (`samples`).
//!
//! Everything here is pure and synchronous.

pub mod lenient;
pub mod ontology;
pub mod samples;
pub mod turtle;
pub mod validate;

pub use ontology::{
    Axiom, Bag, Class, Instance, Ontology, OntologyLoadError, OntologySummary, PropertyValue,
    RangeTerm, Relation, RelationKind, XsdDatatype, LOCAL_REFERENCE_MARKER, SCALAR_TYPE_PREFIX,
};
pub use lenient::text_of;
pub use turtle::to_turtle;
pub use validate::{validate, validate_value, ValidationReport};
