//! Turtle projection.
//!
//! One-way, deterministic and order-preserving: the same ontology value always
//! yields byte-identical text, with classes, parents, relations, instances and
//! instance properties emitted in their stored order. Nothing here parses
//! Turtle back.
//!
//! Layout: prefix header, ontology comment, then the `# Classes`,
//! `# Relations` and `# Instances` blocks, each separated by one blank line.

use crate::ontology::{Ontology, PropertyValue, RangeTerm};
use serde_json::Value;
use std::fmt::Write as _;

pub const BASE_NAMESPACE_ROOT: &str = "http://example.org/";
pub const RDFS_NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";
/// Written as a full IRI so the header only needs the three declared prefixes.
pub const RDF_PROPERTY_IRI: &str = "<http://www.w3.org/1999/02/22-rdf-syntax-ns#Property>";

/// Base namespace for an ontology: `http://example.org/<id>#`.
pub fn base_namespace(ontology_id: &str) -> String {
    format!("{BASE_NAMESPACE_ROOT}{ontology_id}#")
}

/// Render `ontology` as Turtle text.
pub fn to_turtle(ontology: &Ontology) -> String {
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "@prefix : <{}> .", base_namespace(&ontology.id));
    let _ = writeln!(out, "@prefix rdfs: <{RDFS_NAMESPACE}> .");
    let _ = writeln!(out, "@prefix xsd: <{XSD_NAMESPACE}> .");
    out.push('\n');
    let _ = writeln!(out, "# Ontology: {}", ontology.name);
    out.push('\n');

    out.push_str("# Classes\n");
    for class in &ontology.classes {
        let _ = writeln!(out, ":{} a rdfs:Class .", class.id);
        for parent in &class.super_classes {
            let _ = writeln!(out, ":{} rdfs:subClassOf :{parent} .", class.id);
        }
    }
    out.push('\n');

    out.push_str("# Relations\n");
    for relation in &ontology.relations {
        let _ = writeln!(out, ":{} a {RDF_PROPERTY_IRI} .", relation.id);
        if !relation.domain.is_empty() {
            let _ = writeln!(out, ":{} rdfs:domain :{} .", relation.id, relation.domain);
        }
        if !relation.range.is_empty() {
            let _ = writeln!(
                out,
                ":{} rdfs:range {} .",
                relation.id,
                range_term(&relation.range)
            );
        }
    }
    out.push('\n');

    out.push_str("# Instances\n");
    for instance in &ontology.instances {
        let _ = writeln!(out, ":{} a :{} .", instance.id, instance.class_id);
        for (property, value) in &instance.properties {
            let _ = writeln!(
                out,
                ":{} :{property} {} .",
                instance.id,
                object_term(value)
            );
        }
    }

    out
}

fn range_term(range: &str) -> String {
    match RangeTerm::classify(range) {
        RangeTerm::Datatype { tag, .. } => tag.to_string(),
        RangeTerm::Class(class) => format!(":{class}"),
    }
}

fn object_term(value: &Value) -> String {
    match PropertyValue::classify(value) {
        PropertyValue::Typed { value, datatype } => {
            format!("\"{}\"^^{datatype}", escape_literal(&lexical_form(value)))
        }
        PropertyValue::Reference(reference) => reference.to_string(),
        PropertyValue::Literal(value) => format!("\"{}\"", escape_literal(&lexical_form(value))),
    }
}

/// Strings are used as-is; other JSON values by their JSON text.
fn lexical_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
