//! Structural validation.
//!
//! Two entry points share the same checks and messages:
//!
//! - [`validate`] for a typed [`Ontology`] (collections are always sequences),
//! - [`validate_value`] for raw JSON, e.g. the `result` a collaborator sent back.
//!
//! Both are pure and total: every check runs, malformed input becomes an error
//! message, nothing panics. Raw fields are read through
//! [`text_of`](crate::lenient::text_of), the same reading the typed loader uses, so a raw
//! document and its loaded form always get the same verdict and anything
//! [`validate_value`] accepts also loads as an [`Ontology`].
//!
//! Not checked (lenient on purpose, see tests): axiom `statement` ids, instance
//! `classId`, superclass ids and superclass cycles.

use crate::lenient::field_text;
use crate::ontology::{Ontology, RangeTerm};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

const COLLECTIONS: [&str; 4] = ["classes", "relations", "axioms", "instances"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "valid": self.valid, "errors": self.errors })
    }
}

/// One relation, reduced to what the reference check needs.
struct RelationRef<'a> {
    id: &'a str,
    is_object: bool,
    domain: &'a str,
    range: &'a str,
}

fn check_references<'a>(
    class_ids: &HashSet<&str>,
    relations: impl IntoIterator<Item = RelationRef<'a>>,
    errors: &mut Vec<String>,
) {
    for rel in relations {
        if !rel.is_object {
            continue;
        }
        let label = if rel.id.is_empty() { "<missing id>" } else { rel.id };
        if !rel.domain.is_empty() && !class_ids.contains(rel.domain) {
            errors.push(format!(
                "Relation {label} references unknown domain class {}",
                rel.domain
            ));
        }
        if !rel.range.is_empty()
            && !class_ids.contains(rel.range)
            && !RangeTerm::classify(rel.range).is_scalar()
        {
            errors.push(format!(
                "Relation {label} references unknown range class {}",
                rel.range
            ));
        }
    }
}

fn identity_errors(id_present: bool, name_present: bool, errors: &mut Vec<String>) {
    if !id_present {
        errors.push("Ontology must have an id".to_string());
    }
    if !name_present {
        errors.push("Ontology must have a name".to_string());
    }
}

/// Validate a typed ontology.
pub fn validate(ontology: &Ontology) -> ValidationReport {
    let mut errors = Vec::new();
    identity_errors(!ontology.id.is_empty(), !ontology.name.is_empty(), &mut errors);

    let class_ids: HashSet<&str> = ontology.classes.iter().map(|c| c.id.as_str()).collect();
    let relations = ontology.relations.iter().map(|r| RelationRef {
        id: &r.id,
        is_object: r.is_object(),
        domain: &r.domain,
        range: &r.range,
    });
    check_references(&class_ids, relations, &mut errors);

    ValidationReport::from_errors(errors)
}

/// Owned text of the reference-relevant fields of one raw relation.
struct RawRelation {
    id: String,
    kind: String,
    domain: String,
    range: String,
}

impl RawRelation {
    fn read(value: &Value) -> Self {
        Self {
            id: field_text(value.get("id")),
            kind: field_text(value.get("type")),
            domain: field_text(value.get("domain")),
            range: field_text(value.get("range")),
        }
    }

    fn view(&self) -> RelationRef<'_> {
        RelationRef {
            id: &self.id,
            is_object: self.kind == "object",
            domain: &self.domain,
            range: &self.range,
        }
    }
}

/// Validate raw JSON that claims to be an ontology.
pub fn validate_value(value: &Value) -> ValidationReport {
    let mut errors = Vec::new();
    let field = |key: &str| value.as_object().and_then(|o| o.get(key));

    // Any non-empty scalar counts as an id or name, e.g. `"id": 42`.
    identity_errors(
        !field_text(field("id")).is_empty(),
        !field_text(field("name")).is_empty(),
        &mut errors,
    );

    for key in COLLECTIONS {
        if !field(key).map(Value::is_array).unwrap_or(false) {
            errors.push(format!("{key} must be an array"));
        }
    }

    // Reference checks need both sides; a malformed side was already reported above.
    // Entries that are not objects carry no id and are passed over.
    if let (Some(Value::Array(classes)), Some(Value::Array(relations))) =
        (field("classes"), field("relations"))
    {
        let class_ids: Vec<String> = classes
            .iter()
            .filter(|c| c.is_object())
            .map(|c| field_text(c.get("id")))
            .collect();
        let class_ids: HashSet<&str> = class_ids.iter().map(String::as_str).collect();
        let relations: Vec<RawRelation> = relations
            .iter()
            .filter(|r| r.is_object())
            .map(RawRelation::read)
            .collect();
        check_references(&class_ids, relations.iter().map(RawRelation::view), &mut errors);
    }

    ValidationReport::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{Axiom, Class, Instance, Relation};
    use serde_json::json;

    fn scenario_a() -> Ontology {
        Ontology {
            classes: vec![Class::new("Person")],
            relations: vec![Relation::datatype("hasName", "Person", "xsd:string")],
            ..Ontology::new("p1", "People")
        }
    }

    #[test]
    fn datatype_relation_with_known_domain_is_valid() {
        let report = validate(&scenario_a());
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn object_relation_with_unknown_domain_reports_once() {
        let mut o = scenario_a();
        o.relations = vec![Relation::object("hasName", "Nonexistent", "xsd:string")];
        let report = validate(&o);
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec!["Relation hasName references unknown domain class Nonexistent".to_string()]
        );
    }

    #[test]
    fn datatype_relations_are_not_reference_checked() {
        let mut o = scenario_a();
        o.relations = vec![Relation::datatype("hasName", "Nonexistent", "Nowhere")];
        assert!(validate(&o).valid);
    }

    #[test]
    fn object_relation_range_must_be_class_or_scalar() {
        let mut o = scenario_a();
        o.relations = vec![
            Relation::object("hasAddress", "Person", "Address"),
            Relation::object("bornOn", "Person", "xsd:date"),
        ];
        let report = validate(&o);
        assert_eq!(
            report.errors,
            vec!["Relation hasAddress references unknown range class Address".to_string()]
        );
    }

    #[test]
    fn missing_identity_is_reported_independently() {
        let o = Ontology {
            classes: vec![Class::new("A")],
            ..Ontology::new("", "")
        };
        assert_eq!(
            validate(&o).errors,
            vec![
                "Ontology must have an id".to_string(),
                "Ontology must have a name".to_string()
            ]
        );
    }

    #[test]
    fn dangling_axiom_and_instance_class_are_accepted() {
        let mut o = scenario_a();
        let mut statement = serde_json::Map::new();
        statement.insert("subClass".into(), json!("Ghost"));
        statement.insert("superClass".into(), json!("Phantom"));
        o.axioms.push(Axiom {
            id: "ax1".into(),
            kind: "subClassOf".into(),
            statement,
            description: "refers to nothing".into(),
            extra: Default::default(),
        });
        o.instances.push(Instance::new("i1", "NoSuchClass"));
        o.classes.push(Class::new("Loop").with_parent("Loop"));
        assert!(validate(&o).valid);
    }

    #[test]
    fn raw_non_array_collections_are_errors_not_panics() {
        let report = validate_value(&json!({
            "id": "x",
            "name": "X",
            "classes": {"Person": {}},
            "relations": "none",
            "axioms": [],
        }));
        assert_eq!(
            report.errors,
            vec![
                "classes must be an array".to_string(),
                "relations must be an array".to_string(),
                "instances must be an array".to_string(),
            ]
        );
    }

    #[test]
    fn raw_non_object_reports_every_check() {
        let report = validate_value(&json!("not an ontology"));
        assert_eq!(report.errors.len(), 6);
        assert!(!report.valid);
    }

    #[test]
    fn raw_and_typed_agree() {
        let mut o = scenario_a();
        o.relations.push(Relation::object("knows", "Person", "Robot"));
        assert_eq!(validate(&o), validate_value(&o.to_value()));
    }

    #[test]
    fn raw_relation_without_id_still_reported() {
        let report = validate_value(&json!({
            "id": "x", "name": "X",
            "classes": [], "relations": [{"type": "object", "domain": "A"}],
            "axioms": [], "instances": []
        }));
        assert_eq!(
            report.errors,
            vec!["Relation <missing id> references unknown domain class A".to_string()]
        );
    }

    #[test]
    fn raw_non_string_identity_counts_as_present() {
        let report = validate_value(&json!({
            "id": 42, "name": true,
            "classes": [], "relations": [], "axioms": [], "instances": []
        }));
        assert!(report.valid, "{:?}", report.errors);

        let report = validate_value(&json!({
            "id": null, "name": "",
            "classes": [], "relations": [], "axioms": [], "instances": []
        }));
        assert_eq!(
            report.errors,
            vec![
                "Ontology must have an id".to_string(),
                "Ontology must have a name".to_string()
            ]
        );
    }

    #[test]
    fn raw_numeric_references_resolve_like_loaded_ones() {
        let doc = json!({
            "id": "x", "name": "X",
            "classes": [{"id": 1}, "Stray"],
            "relations": [
                {"id": "r", "type": "object", "domain": 1, "range": 2},
                {"id": "s", "type": "object", "domain": "Stray"}
            ],
            "axioms": [], "instances": []
        });
        let report = validate_value(&doc);
        assert_eq!(
            report.errors,
            vec![
                "Relation r references unknown range class 2".to_string(),
                "Relation s references unknown domain class Stray".to_string(),
            ]
        );
        let loaded = Ontology::from_value(doc).unwrap();
        assert_eq!(validate(&loaded), report);
    }

    #[test]
    fn report_serializes_as_valid_errors_pair() {
        let report = ValidationReport::from_errors(vec!["e".into()]);
        assert_eq!(report.to_value(), json!({"valid": false, "errors": ["e"]}));
        assert_eq!(serde_json::to_value(&report).unwrap(), report.to_value());
    }
}
