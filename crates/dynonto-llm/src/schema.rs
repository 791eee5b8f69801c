//! Output schemas: what a collaborator answer must contain, per operation.
//!
//! Each schema is a list of required dotted paths plus a literal output-shape
//! example that is embedded verbatim in the prompt. Typed views over the
//! operation-specific sections are provided for callers that want them; the
//! dispatcher itself works on the raw JSON and only *reports* gaps.

use crate::operation::OperationKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSchema {
    pub kind: OperationKind,
    pub required_paths: &'static [&'static str],
    pub example: &'static str,
}

// ============================================================================
// Required paths
// ============================================================================

const ADDITION_PATHS: &[&str] = &[
    "result",
    "metadata.operation",
    "metadata.sourceOntologies",
    "metadata.conflicts",
    "metadata.statistics",
];

const SUBTRACTION_PATHS: &[&str] = &[
    "result",
    "metadata.operation",
    "metadata.removed.classes",
    "metadata.removed.relations",
    "metadata.removed.instances",
    "metadata.reasoning",
];

const MERGE_PATHS: &[&str] = &[
    "result",
    "alignments",
    "conflicts",
    "metadata.alignmentCount",
    "metadata.conflictCount",
];

const COMPOSITION_PATHS: &[&str] = &["result", "interface.connections", "metadata.connectionCount"];

const DIVISION_PATHS: &[&str] = &[
    "result",
    "analysis.uniqueToFull.classes",
    "analysis.uniqueToFull.relations",
    "analysis.uniqueToFull.instances",
    "analysis.inferredDomain",
    "analysis.certainty",
    "validation.compositionCheck",
    "validation.discrepancies",
    "metadata.alternativeSolutions",
];

const TRANSFORMATION_PATHS: &[&str] = &[
    "result",
    "transformation_metadata.mappings_applied",
    "transformation_metadata.computed_properties",
    "transformation_metadata.unmapped_elements",
    "transformation_metadata.data_quality",
];

// ============================================================================
// Output-shape examples
// ============================================================================

const ADDITION_EXAMPLE: &str = r#"{
  "result": {
    "id": "combined-ontology-id",
    "name": "A + B",
    "classes": [...],
    "relations": [...],
    "axioms": [...],
    "instances": [...],
    "vocabulary": {...}
  },
  "metadata": {
    "operation": "addition",
    "sourceOntologies": ["A", "B"],
    "conflicts": ["list of potential name conflicts"],
    "statistics": {
      "totalClasses": number,
      "totalRelations": number,
      "totalInstances": number
    }
  }
}"#;

const SUBTRACTION_EXAMPLE: &str = r#"{
  "result": {
    "id": "subtracted-ontology-id",
    "name": "A - B",
    "classes": [...],
    "relations": [...],
    "axioms": [...],
    "instances": [...],
    "vocabulary": {...}
  },
  "metadata": {
    "operation": "subtraction",
    "removed": {
      "classes": ["list of removed class IDs"],
      "relations": ["list of removed relation IDs"],
      "instances": ["list of removed instance IDs"]
    },
    "reasoning": ["explanations for each removal"]
  }
}"#;

const MERGE_EXAMPLE: &str = r#"{
  "result": {
    "id": "merged-ontology-id",
    "name": "A ∪ B (merged)",
    "classes": [...],
    "relations": [...],
    "axioms": [...],
    "instances": [...],
    "vocabulary": {...}
  },
  "alignments": [
    {
      "sourceA": "class/relation ID from A",
      "sourceB": "class/relation ID from B",
      "confidence": 0.95,
      "reasoning": "explanation"
    }
  ],
  "conflicts": [
    {
      "description": "conflict description",
      "resolutionStrategies": ["strategy 1", "strategy 2"],
      "selectedStrategy": "strategy 1",
      "reasoning": "why this was chosen"
    }
  ],
  "metadata": {
    "operation": "merge",
    "alignmentCount": number,
    "conflictCount": number
  }
}"#;

const COMPOSITION_EXAMPLE: &str = r#"{
  "result": {
    "id": "composed-ontology-id",
    "name": "A ∘ B (composed)",
    "classes": [...],
    "relations": [...],
    "axioms": [...],
    "instances": [...],
    "vocabulary": {...}
  },
  "interface": {
    "connections": [
      {
        "fromA": "class/relation ID",
        "toB": "class/relation ID",
        "linkRelation": "new relation connecting them",
        "reasoning": "explanation"
      }
    ]
  },
  "metadata": {
    "operation": "composition",
    "connectionCount": number
  }
}"#;

const DIVISION_EXAMPLE: &str = r#"{
  "result": {
    "id": "reconstructed-ontology-id",
    "name": "Unknown component (O_B)",
    "classes": [...],
    "relations": [...],
    "axioms": [...],
    "instances": [...],
    "vocabulary": {...}
  },
  "analysis": {
    "uniqueToFull": {
      "classes": ["IDs"],
      "relations": ["IDs"],
      "instances": ["IDs"]
    },
    "inferredDomain": "description of what the unknown component represents",
    "certainty": "high/medium/low"
  },
  "validation": {
    "compositionCheck": "whether Known + Unknown ≈ Full",
    "discrepancies": ["any elements that don't fit perfectly"]
  },
  "metadata": {
    "operation": "division",
    "alternativeSolutions": ["descriptions of other possible reconstructions"]
  }
}"#;

const TRANSFORMATION_EXAMPLE: &str = r#"{
  "result": {
    "id": "transformed-ontology-id",
    "name": "A → B (transformed)",
    "metadata": {
      "operation": "transformation",
      "sourceOntology": "ID of A",
      "targetSchema": "ID of B"
    },
    "classes": [...],
    "relations": [...],
    "axioms": [...],
    "instances": [...],
    "vocabulary": {...}
  },
  "transformation_metadata": {
    "mappings_applied": [
      {
        "source": "element of A",
        "target": "element of B",
        "rule": "how the value was carried over"
      }
    ],
    "computed_properties": [
      {
        "property": "property of B",
        "formula": "how it was computed",
        "instances": ["IDs"]
      }
    ],
    "unmapped_elements": ["elements of A with no counterpart in B"],
    "data_quality": {
      "completeness": 0.9,
      "issues": ["missing or suspicious values"]
    }
  }
}"#;

const ADDITION: OutputSchema = OutputSchema {
    kind: OperationKind::Addition,
    required_paths: ADDITION_PATHS,
    example: ADDITION_EXAMPLE,
};
const SUBTRACTION: OutputSchema = OutputSchema {
    kind: OperationKind::Subtraction,
    required_paths: SUBTRACTION_PATHS,
    example: SUBTRACTION_EXAMPLE,
};
const MERGE: OutputSchema = OutputSchema {
    kind: OperationKind::Merge,
    required_paths: MERGE_PATHS,
    example: MERGE_EXAMPLE,
};
const COMPOSITION: OutputSchema = OutputSchema {
    kind: OperationKind::Composition,
    required_paths: COMPOSITION_PATHS,
    example: COMPOSITION_EXAMPLE,
};
const DIVISION: OutputSchema = OutputSchema {
    kind: OperationKind::Division,
    required_paths: DIVISION_PATHS,
    example: DIVISION_EXAMPLE,
};
const TRANSFORMATION: OutputSchema = OutputSchema {
    kind: OperationKind::Transformation,
    required_paths: TRANSFORMATION_PATHS,
    example: TRANSFORMATION_EXAMPLE,
};

impl OutputSchema {
    pub fn for_kind(kind: OperationKind) -> &'static OutputSchema {
        match kind {
            OperationKind::Addition => &ADDITION,
            OperationKind::Subtraction => &SUBTRACTION,
            OperationKind::Merge => &MERGE,
            OperationKind::Composition => &COMPOSITION,
            OperationKind::Division => &DIVISION,
            OperationKind::Transformation => &TRANSFORMATION,
        }
    }

    /// Required paths that are absent (or `null`) in `payload`.
    pub fn missing_paths(&self, payload: &Value) -> Vec<&'static str> {
        self.required_paths
            .iter()
            .copied()
            .filter(|path| lookup_path(payload, path).map_or(true, Value::is_null))
            .collect()
    }

    /// Values that are present but outside their declared range.
    ///
    /// Only checks sections that exist; absence is `missing_paths`' business.
    pub fn range_issues(&self, payload: &Value) -> Vec<String> {
        let mut issues = Vec::new();
        match self.kind {
            OperationKind::Merge => {
                if let Some(alignments) = payload.get("alignments").and_then(Value::as_array) {
                    for (i, alignment) in alignments.iter().enumerate() {
                        let ok = alignment
                            .get("confidence")
                            .and_then(Value::as_f64)
                            .is_some_and(|c| (0.0..=1.0).contains(&c));
                        if !ok {
                            issues.push(format!(
                                "alignments[{i}].confidence must be a number in [0, 1]"
                            ));
                        }
                    }
                }
                count_matches(payload, "alignments", "metadata.alignmentCount", &mut issues);
                count_matches(payload, "conflicts", "metadata.conflictCount", &mut issues);
            }
            OperationKind::Composition => {
                count_matches(
                    payload,
                    "interface.connections",
                    "metadata.connectionCount",
                    &mut issues,
                );
            }
            OperationKind::Division => {
                if let Some(certainty) = lookup_path(payload, "analysis.certainty") {
                    let ok = certainty
                        .as_str()
                        .is_some_and(|s| Certainty::parse(s).is_some());
                    if !ok {
                        issues.push(format!(
                            "analysis.certainty must be one of high, medium, low (got {certainty})"
                        ));
                    }
                }
            }
            OperationKind::Transformation => {
                if let Some(completeness) =
                    lookup_path(payload, "transformation_metadata.data_quality.completeness")
                {
                    let ok = completeness
                        .as_f64()
                        .is_some_and(|c| (0.0..=1.0).contains(&c));
                    if !ok {
                        issues.push(
                            "transformation_metadata.data_quality.completeness must be a number in [0, 1]"
                                .to_string(),
                        );
                    }
                }
            }
            OperationKind::Addition | OperationKind::Subtraction => {}
        }
        issues
    }
}

/// Resolve a dotted path through nested objects.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

fn count_matches(payload: &Value, list_path: &str, count_path: &str, issues: &mut Vec<String>) {
    let list = lookup_path(payload, list_path).and_then(Value::as_array);
    let count = lookup_path(payload, count_path).and_then(Value::as_u64);
    if let (Some(list), Some(count)) = (list, count) {
        if list.len() as u64 != count {
            issues.push(format!(
                "{count_path} ({count}) does not match {list_path} ({} entries)",
                list.len()
            ));
        }
    }
}

// ============================================================================
// Typed views
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alignment {
    pub source_a: String,
    pub source_b: String,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl Alignment {
    pub fn is_unified(&self) -> bool {
        self.confidence > crate::operation::MERGE_CONFIDENCE_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConflict {
    pub description: String,
    #[serde(default)]
    pub resolution_strategies: Vec<String>,
    #[serde(default)]
    pub selected_strategy: String,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from_a: String,
    pub to_b: String,
    pub link_relation: String,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Certainty {
    High,
    Medium,
    Low,
}

impl Certainty {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Certainty::High),
            "medium" => Some(Certainty::Medium),
            "low" => Some(Certainty::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniqueToFull {
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub relations: Vec<String>,
    #[serde(default)]
    pub instances: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionAnalysis {
    pub unique_to_full: UniqueToFull,
    pub inferred_domain: String,
    pub certainty: Certainty,
}

/// Transformation bookkeeping. Field names are snake_case on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformationMetadata {
    #[serde(default)]
    pub mappings_applied: Vec<Value>,
    #[serde(default)]
    pub computed_properties: Vec<Value>,
    #[serde(default)]
    pub unmapped_elements: Vec<Value>,
    #[serde(default)]
    pub data_quality: Value,
}

fn section<T: for<'de> Deserialize<'de>>(
    payload: &Value,
    path: &str,
) -> Option<Result<T, serde_json::Error>> {
    lookup_path(payload, path).map(|v| T::deserialize(v))
}

pub fn alignments(payload: &Value) -> Option<Result<Vec<Alignment>, serde_json::Error>> {
    section(payload, "alignments")
}

pub fn merge_conflicts(payload: &Value) -> Option<Result<Vec<MergeConflict>, serde_json::Error>> {
    section(payload, "conflicts")
}

pub fn connections(payload: &Value) -> Option<Result<Vec<Connection>, serde_json::Error>> {
    section(payload, "interface.connections")
}

pub fn division_analysis(payload: &Value) -> Option<Result<DivisionAnalysis, serde_json::Error>> {
    section(payload, "analysis")
}

pub fn transformation_metadata(
    payload: &Value,
) -> Option<Result<TransformationMetadata, serde_json::Error>> {
    section(payload, "transformation_metadata")
}
