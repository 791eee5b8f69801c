//! Deterministic canned responses used when no collaborator credential is
//! configured. Selection is a pure function of the operation kind.

use crate::operation::OperationKind;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedResponse {
    Addition,
    Merge,
    Generic,
}

impl From<OperationKind> for CannedResponse {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Addition => CannedResponse::Addition,
            OperationKind::Merge => CannedResponse::Merge,
            OperationKind::Subtraction
            | OperationKind::Composition
            | OperationKind::Division
            | OperationKind::Transformation => CannedResponse::Generic,
        }
    }
}

fn empty_result(id: &str, name: &str, metadata: Value) -> Value {
    json!({
        "id": id,
        "name": name,
        "version": "1.0",
        "metadata": metadata,
        "classes": [],
        "relations": [],
        "axioms": [],
        "instances": [],
        "vocabulary": {}
    })
}

impl CannedResponse {
    pub fn payload(self) -> Value {
        match self {
            CannedResponse::Addition => json!({
                "result": empty_result(
                    "mock-addition-result",
                    "Mock Addition Result",
                    json!({"operation": "addition", "mock": true}),
                ),
                "metadata": {
                    "operation": "addition",
                    "sourceOntologies": ["A", "B"],
                    "conflicts": [],
                    "statistics": {"totalClasses": 0, "totalRelations": 0, "totalInstances": 0}
                }
            }),
            CannedResponse::Merge => json!({
                "result": empty_result(
                    "mock-merge-result",
                    "Mock Merge Result",
                    json!({"operation": "merge", "mock": true}),
                ),
                "alignments": [{
                    "sourceA": "Person",
                    "sourceB": "Human",
                    "confidence": 0.95,
                    "reasoning": "Semantically equivalent concepts"
                }],
                "conflicts": [],
                "metadata": {"operation": "merge", "alignmentCount": 1, "conflictCount": 0}
            }),
            CannedResponse::Generic => json!({
                "result": empty_result("mock-result", "Mock Result", json!({"mock": true})),
                "metadata": {"operation": "unknown", "mock": true}
            }),
        }
    }
}

/// The canned collaborator answer for `kind`, as text.
pub fn canned_text(kind: OperationKind) -> String {
    CannedResponse::from(kind).payload().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynonto_model::validate_value;

    #[test]
    fn selection_is_keyed_by_kind() {
        assert_eq!(CannedResponse::from(OperationKind::Addition), CannedResponse::Addition);
        assert_eq!(CannedResponse::from(OperationKind::Merge), CannedResponse::Merge);
        for kind in [
            OperationKind::Subtraction,
            OperationKind::Composition,
            OperationKind::Division,
            OperationKind::Transformation,
        ] {
            assert_eq!(CannedResponse::from(kind), CannedResponse::Generic);
        }
    }

    #[test]
    fn canned_results_are_structurally_valid() {
        for canned in [CannedResponse::Addition, CannedResponse::Merge, CannedResponse::Generic] {
            let payload = canned.payload();
            assert!(validate_value(&payload["result"]).valid, "{canned:?}");
        }
    }

    #[test]
    fn merge_carries_one_alignment() {
        let payload = CannedResponse::Merge.payload();
        assert_eq!(payload["alignments"][0]["confidence"], 0.95);
        assert_eq!(payload["metadata"]["alignmentCount"], 1);
    }

    #[test]
    fn text_is_stable() {
        assert_eq!(canned_text(OperationKind::Division), canned_text(OperationKind::Division));
        assert!(canned_text(OperationKind::Addition).contains("\"operation\":\"addition\""));
    }
}
