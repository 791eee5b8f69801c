//! Reference ontologies: a person/employee model, a factory production model
//! and a GHG emission reporting model. The latter two compose naturally
//! (`ProductionBatch` → `EmissionEntry.sourceFor`).

use crate::ontology::{Axiom, Bag, Class, Instance, Ontology, Relation};
use serde_json::{json, Value};

pub const SAMPLE_NAMES: [&str; 3] = ["person", "factory", "ghg"];

pub fn by_name(name: &str) -> Option<Ontology> {
    match name {
        "person" => Some(person()),
        "factory" => Some(factory()),
        "ghg" => Some(ghg()),
        _ => None,
    }
}

/// All samples, keyed by name, in [`SAMPLE_NAMES`] order.
pub fn all() -> Vec<(&'static str, Ontology)> {
    SAMPLE_NAMES
        .iter()
        .filter_map(|name| by_name(name).map(|o| (*name, o)))
        .collect()
}

fn bag(pairs: &[(&str, Value)]) -> Bag {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn described(mut class: Class, name: &str, description: &str) -> Class {
    class.name = name.to_string();
    if !description.is_empty() {
        class.metadata = bag(&[("description", json!(description))]);
    }
    class
}

fn named(mut relation: Relation, name: &str) -> Relation {
    relation.name = name.to_string();
    relation
}

pub fn person() -> Ontology {
    let mut has_name = named(Relation::datatype("hasName", "Person", "xsd:string"), "has name");
    has_name.constraints = bag(&[("functional", json!(true))]);

    Ontology {
        metadata: bag(&[(
            "description",
            json!("Simple ontology for person information"),
        )]),
        classes: vec![
            described(Class::new("Person"), "Person", "A human being"),
            described(
                Class::new("Employee").with_parent("Person"),
                "Employee",
                "A person employed by an organization",
            ),
            described(Class::new("Address"), "Address", "Physical address"),
        ],
        relations: vec![
            has_name,
            named(Relation::object("hasAddress", "Person", "Address"), "has address"),
            named(Relation::datatype("worksAt", "Employee", "xsd:string"), "works at"),
        ],
        axioms: vec![Axiom {
            id: "employee-subclass".to_string(),
            kind: "subClassOf".to_string(),
            statement: bag(&[
                ("subClass", json!("Employee")),
                ("superClass", json!("Person")),
            ]),
            description: "Employee is a subclass of Person".to_string(),
            extra: Bag::new(),
        }],
        instances: vec![Instance::new("john", "Employee")
            .with_property("hasName", "John Doe")
            .with_property("worksAt", "Acme Corp")],
        ..Ontology::new("person-ontology", "Person Ontology")
    }
}

pub fn factory() -> Ontology {
    let mut f1 = Instance::new("F1", "Factory");
    f1.metadata = bag(&[("name", json!("Factory 1"))]);
    let mut widget = Instance::new("WidgetX", "Product");
    widget.metadata = bag(&[("name", json!("Widget X"))]);

    Ontology {
        metadata: bag(&[(
            "description",
            json!("Ontology for factory production tracking"),
        )]),
        classes: vec![
            described(Class::new("Factory"), "Factory", ""),
            described(Class::new("ProductionBatch"), "Production Batch", ""),
            described(Class::new("Product"), "Product", ""),
        ],
        relations: vec![
            named(Relation::object("produces", "Factory", "ProductionBatch"), "produces"),
            named(Relation::object("batchOf", "ProductionBatch", "Product"), "batch of"),
            named(Relation::datatype("quantity", "ProductionBatch", "xsd:decimal"), "quantity"),
            named(
                Relation::datatype("timestamp", "ProductionBatch", "xsd:dateTime"),
                "timestamp",
            ),
        ],
        instances: vec![
            f1,
            Instance::new("Batch_2025_11_01", "ProductionBatch")
                .with_property("batchOf", ":WidgetX")
                .with_typed("quantity", "1000", "xsd:decimal")
                .with_typed("timestamp", "2025-11-01T08:00:00", "xsd:dateTime"),
            widget,
        ],
        ..Ontology::new("factory-production", "Factory Production")
    }
}

pub fn ghg() -> Ontology {
    fn with_description(mut relation: Relation, name: &str, description: &str) -> Relation {
        relation.name = name.to_string();
        relation.metadata = bag(&[("description", json!(description))]);
        relation
    }

    Ontology {
        metadata: bag(&[("description", json!("Ontology for GHG emission reporting"))]),
        classes: vec![
            described(Class::new("EmissionReport"), "Emission Report", ""),
            described(Class::new("EmissionEntry"), "Emission Entry", ""),
            described(Class::new("EmissionSource"), "Emission Source", ""),
        ],
        relations: vec![
            named(
                Relation::object("hasSource", "EmissionReport", "EmissionEntry"),
                "has source",
            ),
            with_description(
                Relation::datatype("sourceFor", "EmissionEntry", "xsd:string"),
                "source for",
                "Reference to production batch",
            ),
            with_description(
                Relation::datatype("activity", "EmissionEntry", "xsd:decimal"),
                "activity",
                "Activity amount (e.g., production quantity)",
            ),
            with_description(
                Relation::datatype("emissionFactor", "EmissionEntry", "xsd:decimal"),
                "emission factor",
                "Emission factor (e.g., kgCO2e per unit)",
            ),
            with_description(
                Relation::datatype("emissions", "EmissionEntry", "xsd:decimal"),
                "emissions",
                "Calculated emissions (kgCO2e)",
            ),
        ],
        instances: vec![Instance::new("Entry_1", "EmissionEntry")
            .with_property("sourceFor", "Batch_2025_11_01")
            .with_typed("activity", "1000", "xsd:decimal")
            .with_typed("emissionFactor", "0.75", "xsd:decimal")
            .with_typed("emissions", "750", "xsd:decimal")],
        ..Ontology::new("ghg-report", "GHG Report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    #[test]
    fn every_sample_validates() {
        for (name, ontology) in all() {
            let report = validate(&ontology);
            assert!(report.valid, "{name}: {:?}", report.errors);
        }
    }

    #[test]
    fn samples_reload_from_their_json() {
        for (name, ontology) in all() {
            let reloaded = Ontology::from_value(ontology.to_value()).unwrap();
            assert_eq!(reloaded, ontology, "{name}");
        }
    }

    #[test]
    fn unknown_sample_is_none() {
        assert!(by_name("weather").is_none());
    }

    #[test]
    fn factory_batch_references_widget() {
        let o = factory();
        let batch = o.instance("Batch_2025_11_01").unwrap();
        assert_eq!(batch.properties.get("batchOf"), Some(&json!(":WidgetX")));
        assert_eq!(
            batch.properties.get("quantity"),
            Some(&json!({"value": "1000", "type": "xsd:decimal"}))
        );
    }
}
