//! Operation contracts: the prompt sent to the collaborator for one operation,
//! together with the output schema its answer is checked against.
//!
//! Rendering is pure. The same inputs always produce the same prompt and
//! therefore the same digest.

use crate::digest::contract_digest;
use crate::error::OperationError;
use crate::operation::{OperationKind, MERGE_CONFIDENCE_THRESHOLD};
use crate::request::OperationRequest;
use crate::schema::OutputSchema;
use dynonto_model::Ontology;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;

/// Borrowed view of everything a contract is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct OperationInputs<'a> {
    pub kind: OperationKind,
    pub first: Option<&'a Ontology>,
    pub second: Option<&'a Ontology>,
    pub auxiliary: Option<&'a Value>,
}

impl<'a> From<&'a OperationRequest> for OperationInputs<'a> {
    fn from(request: &'a OperationRequest) -> Self {
        Self {
            kind: request.kind,
            first: request.ontology_a.as_ref(),
            second: request.ontology_b.as_ref(),
            auxiliary: request.auxiliary.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationContract {
    #[serde(rename = "operation")]
    pub kind: OperationKind,
    pub prompt: String,
    pub required_output: &'static [&'static str],
    pub digest: String,
}

impl OperationContract {
    pub fn schema(&self) -> &'static OutputSchema {
        OutputSchema::for_kind(self.kind)
    }
}

struct Template {
    title: &'static str,
    intent: &'static str,
    first_heading: &'static str,
    second_heading: &'static str,
}

fn template(kind: OperationKind) -> Template {
    match kind {
        OperationKind::Addition => Template {
            title: "Ontology Addition (Disjoint Union)",
            intent: "You are performing a SIMPLE ADDITION (disjoint union) of two ontologies.\n\
                     This operation creates a union WITHOUT trying to align or merge similar concepts.\n\
                     All classes, relations, and instances from both ontologies are preserved as separate entities.",
            first_heading: "Input Ontology A",
            second_heading: "Input Ontology B",
        },
        OperationKind::Subtraction => Template {
            title: "Ontology Subtraction (Set Difference)",
            intent: "You are performing SUBTRACTION: removing all elements of Ontology B from Ontology A.\n\
                     This operation removes classes, relations, axioms, and instances that appear in B from A.",
            first_heading: "Input Ontology A (base)",
            second_heading: "Input Ontology B (to remove)",
        },
        OperationKind::Merge => Template {
            title: "Ontology Merge (Alignment-based Union)",
            intent: "You are performing an INTELLIGENT MERGE of two ontologies.\n\
                     This operation identifies semantic correspondences (alignments) between concepts and merges them appropriately.",
            first_heading: "Input Ontology A",
            second_heading: "Input Ontology B",
        },
        OperationKind::Composition => Template {
            title: "Ontology Composition (Interface-based)",
            intent: "You are performing COMPOSITION: connecting two ontologies through a shared interface.\n\
                     Ontology A's output types should match Ontology B's input types through the interface.",
            first_heading: "Input Ontology A",
            second_heading: "Input Ontology B",
        },
        OperationKind::Division => Template {
            title: "Ontology Division (Inverse Problem)",
            intent: "You are performing DIVISION: reconstructing a missing ontology component.\n\
                     Given the full (merged) ontology and one known component, infer what the unknown component should be.",
            first_heading: "Input: Full Ontology (merged result)",
            second_heading: "Input: Known Component",
        },
        OperationKind::Transformation => Template {
            title: "Ontology Transformation (Schema Mapping)",
            intent: "You are performing TRANSFORMATION: re-expressing the instances of a source ontology\n\
                     in the classes and relations of a target schema, computing derived values where needed.",
            first_heading: "Input Ontology A (source)",
            second_heading: "Input Ontology B (target schema)",
        },
    }
}

fn instructions(kind: OperationKind) -> String {
    match kind {
        OperationKind::Addition => "\
1. Combine all classes from both ontologies (keep them separate even if names are similar)
2. Combine all relations from both ontologies
3. Combine all axioms from both ontologies
4. Combine all instances from both ontologies
5. Prefix class/relation IDs to avoid collisions (e.g., A_Person, B_Human)
6. Note any potential name conflicts but DO NOT merge them"
            .to_string(),
        OperationKind::Subtraction => "\
1. Identify matching elements between A and B (by ID or semantic similarity)
2. Remove from A:
   - Classes that match B's classes
   - Relations that match B's relations
   - Axioms that reference removed classes/relations
   - Instances of removed classes
3. Ensure referential integrity (remove dangling references)
4. Document what was removed and why"
            .to_string(),
        OperationKind::Merge => format!(
            "\
1. **Alignment Phase**: Identify correspondences between A and B
   - Find semantically equivalent classes (e.g., Person ≡ Human)
   - Find equivalent relations (e.g., hasName ≡ name)
   - Assign confidence scores (0.0 to 1.0)

2. **Merge Phase**: For each alignment with confidence > {MERGE_CONFIDENCE_THRESHOLD}:
   - Unify the concepts under a single ID
   - Merge their properties and constraints
   - Resolve conflicts (e.g., different cardinalities)

3. **Conflict Resolution**: For contradictions:
   - List all detected conflicts
   - Propose 2-3 resolution strategies for each
   - Select the most reasonable one

4. **Integration**: Add non-aligned elements from both ontologies"
        ),
        OperationKind::Composition => "\
1. **Interface Detection**: Identify compatible connection points
   - Output classes/relations from A that can feed into B
   - Input classes/relations in B that can receive from A
   - Example: A's \"ProductionBatch\" → B's \"EmissionEntry.sourceFor\"

2. **Connection**: Create linking relations
   - Add relations that connect A's outputs to B's inputs
   - Ensure type compatibility

3. **Composition**: Build the composed ontology
   - Include all elements from A and B
   - Add interface relations
   - Propagate constraints"
            .to_string(),
        OperationKind::Division => "\
1. **Difference Analysis**: Identify elements in Full that are NOT in Known
   - Classes unique to Full
   - Relations unique to Full
   - Instances and axioms not explained by Known

2. **Pattern Inference**: Look for coherent patterns in the difference
   - Group related classes/relations
   - Identify the conceptual domain of the missing component

3. **Reconstruction**: Build the most plausible unknown component
   - Apply Occam's razor (simplest explanation)
   - Ensure it's coherent and self-contained
   - When composed with Known, it should approximate Full

4. **Validation**: Check that Known + Unknown ≈ Full"
            .to_string(),
        OperationKind::Transformation => "\
1. **Mapping**: Match each class and relation of A to its counterpart in B
   - Apply the mapping rules when given, otherwise infer them
   - Record every mapping that was applied

2. **Conversion**: Re-express every instance of A as instances of B's classes
   - Carry values across mapped relations, converting datatypes where needed
   - Compute properties that B requires but A only implies, and record the formula

3. **Residue**: List elements of A that have no counterpart in B

4. **Quality**: Estimate completeness (0.0 to 1.0) and list data quality issues"
            .to_string(),
    }
}

/// Render the contract for one operation.
///
/// Fails only when a required operand is absent. The auxiliary input of
/// composition and transformation is optional and replaced by an
/// auto-detect directive when missing.
pub fn build_contract(inputs: &OperationInputs<'_>) -> Result<OperationContract, OperationError> {
    let kind = inputs.kind;
    let (first_label, second_label) = kind.operand_labels();
    let first = inputs.first.ok_or(OperationError::MissingOperand {
        operation: kind,
        operand: first_label,
    })?;
    let second = inputs.second.ok_or(OperationError::MissingOperand {
        operation: kind,
        operand: second_label,
    })?;

    let template = template(kind);
    let schema = OutputSchema::for_kind(kind);

    let mut prompt = String::new();
    let _ = writeln!(prompt, "# Task: {}\n", template.title);
    let _ = writeln!(prompt, "{}\n", template.intent);
    let _ = writeln!(prompt, "## {}:\n{:#}\n", template.first_heading, first.to_value());
    let _ = writeln!(prompt, "## {}:\n{:#}\n", template.second_heading, second.to_value());
    if let Some(aux) = kind.auxiliary() {
        let spec = inputs
            .auxiliary
            .cloned()
            .unwrap_or_else(|| aux.default_directive());
        let _ = writeln!(prompt, "## {}:\n{:#}\n", aux.heading(), spec);
    }
    let _ = writeln!(prompt, "## Instructions:\n{}\n", instructions(kind));
    prompt.push_str("## Required Output Keys:\n");
    for path in schema.required_paths {
        let _ = writeln!(prompt, "- {path}");
    }
    let _ = writeln!(prompt, "\n## Output Format (JSON):\n{}\n", schema.example);
    prompt.push_str("Generate the complete result following this schema.\n");

    let digest = contract_digest(&prompt);
    Ok(OperationContract {
        kind,
        prompt,
        required_output: schema.required_paths,
        digest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynonto_model::samples;
    use serde_json::json;

    fn inputs<'a>(
        kind: OperationKind,
        a: &'a Ontology,
        b: &'a Ontology,
        aux: Option<&'a Value>,
    ) -> OperationInputs<'a> {
        OperationInputs {
            kind,
            first: Some(a),
            second: Some(b),
            auxiliary: aux,
        }
    }

    #[test]
    fn merge_prompt_names_alignment_outputs_and_threshold() {
        let (a, b) = (samples::person(), samples::factory());
        let contract = build_contract(&inputs(OperationKind::Merge, &a, &b, None)).unwrap();
        for needle in ["alignments", "conflicts", "metadata.alignmentCount", "> 0.8"] {
            assert!(contract.prompt.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn prompt_embeds_both_ontologies() {
        let (a, b) = (samples::factory(), samples::ghg());
        let contract = build_contract(&inputs(OperationKind::Addition, &a, &b, None)).unwrap();
        assert!(contract.prompt.starts_with("# Task: Ontology Addition"));
        assert!(contract.prompt.contains("\"id\": \"factory-production\""));
        assert!(contract.prompt.contains("\"id\": \"ghg-report\""));
        assert!(contract
            .prompt
            .ends_with("Generate the complete result following this schema.\n"));
    }

    #[test]
    fn prompt_embeds_operands_as_sent() {
        let doc = json!({
            "id": "survey",
            "name": "Survey",
            "classes": [{"id": "Site", "description": "a sampling location"}],
            "relations": [],
            "axioms": [],
            "instances": [{"id": "s1", "classId": "Site", "label": "North ridge"}],
            "source": "field-notes"
        });
        let a = Ontology::from_value(doc.clone()).unwrap();
        let b = Ontology::from_value(json!({"id": "b", "name": "B"})).unwrap();
        let contract = build_contract(&inputs(OperationKind::Addition, &a, &b, None)).unwrap();

        assert!(contract.prompt.contains(&format!("{doc:#}")));
        assert!(contract.prompt.contains("\"description\": \"a sampling location\""));
        assert!(contract.prompt.contains("\"label\": \"North ridge\""));
        assert!(!contract.prompt.contains("\"version\""));
    }

    #[test]
    fn composition_substitutes_auto_detect_directive() {
        let (a, b) = (samples::factory(), samples::ghg());
        let contract = build_contract(&inputs(OperationKind::Composition, &a, &b, None)).unwrap();
        assert!(contract.prompt.contains("## Interface Specification:"));
        assert!(contract.prompt.contains("Auto-detect compatible interfaces"));

        let spec = json!({"from": "ProductionBatch", "to": "EmissionEntry.sourceFor"});
        let contract =
            build_contract(&inputs(OperationKind::Composition, &a, &b, Some(&spec))).unwrap();
        assert!(!contract.prompt.contains("Auto-detect"));
        assert!(contract.prompt.contains("EmissionEntry.sourceFor"));
    }

    #[test]
    fn transformation_substitutes_inference_directive() {
        let (a, b) = (samples::factory(), samples::ghg());
        let contract =
            build_contract(&inputs(OperationKind::Transformation, &a, &b, None)).unwrap();
        assert!(contract.prompt.contains("## Mapping Rules:"));
        assert!(contract
            .prompt
            .contains("Infer mappings from source to target schema"));
        assert!(contract.prompt.contains("transformation_metadata.data_quality"));
    }

    #[test]
    fn auxiliary_is_ignored_for_binary_kinds() {
        let (a, b) = (samples::person(), samples::person());
        let spec = json!({"description": "should not appear"});
        let contract =
            build_contract(&inputs(OperationKind::Subtraction, &a, &b, Some(&spec))).unwrap();
        assert!(!contract.prompt.contains("should not appear"));
    }

    #[test]
    fn division_names_its_operands() {
        let full = samples::ghg();
        let err = build_contract(&OperationInputs {
            kind: OperationKind::Division,
            first: Some(&full),
            second: None,
            auxiliary: None,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            OperationError::MissingOperand { operation: OperationKind::Division, operand: "ontologyKnown" }
        ));
    }

    #[test]
    fn missing_first_operand_reported_first() {
        let err = build_contract(&OperationInputs {
            kind: OperationKind::Merge,
            first: None,
            second: None,
            auxiliary: None,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "ontologyA is required for the merge operation");
    }

    #[test]
    fn rendering_is_deterministic() {
        let (a, b) = (samples::factory(), samples::ghg());
        for kind in OperationKind::ALL {
            let first = build_contract(&inputs(kind, &a, &b, None)).unwrap();
            let second = build_contract(&inputs(kind, &a, &b, None)).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn required_output_section_lists_schema_paths() {
        let (a, b) = (samples::factory(), samples::ghg());
        let contract = build_contract(&inputs(OperationKind::Division, &a, &b, None)).unwrap();
        assert!(contract
            .prompt
            .contains("## Required Output Keys:\n- result\n- analysis.uniqueToFull.classes\n"));
        assert_eq!(contract.required_output, contract.schema().required_paths);
        assert!(contract.prompt.contains("Known + Unknown ≈ Full"));
    }
}
