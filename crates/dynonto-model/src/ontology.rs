//! Ontology data model: O = (C, R, A, I, Σ)
//!
//! The wire format is camelCase JSON (`superClasses`, `classId`, `type`), the
//! same shape a collaborator is asked to return. Open-ended fields (`metadata`,
//! `constraints`, `statement`, `vocabulary`, instance `properties`) are kept as
//! schema-free [`Bag`]s; they are operation-specific and deliberately
//! extensible. Keys the model does not name land in each value's `extra` bag
//! and serialize back unchanged, and empty optional fields are not written.
//!
//! Loading is as tolerant as [`validate_value`](crate::validate_value): see
//! [`lenient`](crate::lenient) for how odd field values are read.
//!
//! Values are immutable by convention: operations produce new ontologies and
//! never edit their inputs.

use crate::lenient;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Schema-free key/value bag (insertion ordered).
pub type Bag = Map<String, Value>;

/// Prefix marking a relation range (or typed literal) as an external scalar type.
pub const SCALAR_TYPE_PREFIX: &str = "xsd:";

/// Prefix marking an instance property value as a reference to another instance.
pub const LOCAL_REFERENCE_MARKER: &str = ":";

/// Version stamped on ontologies built in code. Loaded documents keep theirs, or none.
pub const DEFAULT_VERSION: &str = "1.0";

// ============================================================================
// Aggregate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ontology {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Kept as sent; `"1.0"` and `2` are both seen in the wild.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default, deserialize_with = "lenient::bag", skip_serializing_if = "Bag::is_empty")]
    pub metadata: Bag,
    /// C
    #[serde(default, deserialize_with = "lenient::entries")]
    pub classes: Vec<Class>,
    /// R
    #[serde(default, deserialize_with = "lenient::entries")]
    pub relations: Vec<Relation>,
    /// A
    #[serde(default, deserialize_with = "lenient::entries")]
    pub axioms: Vec<Axiom>,
    /// I
    #[serde(default, deserialize_with = "lenient::entries")]
    pub instances: Vec<Instance>,
    /// Σ: reserved for shared prefixes/terms.
    #[serde(default, deserialize_with = "lenient::bag", skip_serializing_if = "Bag::is_empty")]
    pub vocabulary: Bag,
    #[serde(flatten)]
    pub extra: Bag,
}

impl Default for Ontology {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            version: Some(Value::String(DEFAULT_VERSION.to_string())),
            metadata: Bag::new(),
            classes: Vec::new(),
            relations: Vec::new(),
            axioms: Vec::new(),
            instances: Vec::new(),
            vocabulary: Bag::new(),
            extra: Bag::new(),
        }
    }
}

impl Ontology {
    /// Bare ontology with the given identity and no content.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Empty template stamped with a creation time, the shape editors start from.
    pub fn empty(id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut metadata = Bag::new();
        metadata.insert(
            "created".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        metadata.insert("description".to_string(), Value::String(String::new()));
        Self {
            metadata,
            ..Self::new(id, name)
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, OntologyLoadError> {
        serde_json::from_str(text).map_err(OntologyLoadError::Json)
    }

    pub fn from_value(value: Value) -> Result<Self, OntologyLoadError> {
        serde_json::from_value(value).map_err(OntologyLoadError::Json)
    }

    pub fn to_value(&self) -> Value {
        // Every field is a string, sequence or string-keyed map, so this cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn instance(&self, id: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn summary(&self) -> OntologySummary {
        OntologySummary {
            id: self.id.clone(),
            name: self.name.clone(),
            class_count: self.classes.len(),
            relation_count: self.relations.len(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OntologyLoadError {
    #[error("ontology is not valid JSON for the model: {0}")]
    Json(#[source] serde_json::Error),
}

/// Compact description of an ontology, returned next to rendered prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologySummary {
    pub id: String,
    pub name: String,
    pub class_count: usize,
    pub relation_count: usize,
}

// ============================================================================
// C: classes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Parent class ids, in declaration order. Cycles are not checked.
    #[serde(
        default,
        deserialize_with = "lenient::text_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub super_classes: Vec<String>,
    #[serde(default, deserialize_with = "lenient::bag", skip_serializing_if = "Bag::is_empty")]
    pub metadata: Bag,
    #[serde(flatten)]
    pub extra: Bag,
}

impl Class {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            super_classes: Vec::new(),
            metadata: Bag::new(),
            extra: Bag::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.super_classes.push(parent.into());
        self
    }
}

// ============================================================================
// R: relations
// ============================================================================

/// Relation `type` tag. The set is open: unrecognised tags are kept as sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum RelationKind {
    /// Links two classes; domain and range are checked against C.
    Object,
    /// Links a class to a scalar datatype.
    Datatype,
    Other(String),
}

impl RelationKind {
    pub fn as_str(&self) -> &str {
        match self {
            RelationKind::Object => "object",
            RelationKind::Datatype => "datatype",
            RelationKind::Other(tag) => tag,
        }
    }
}

impl From<String> for RelationKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "object" => RelationKind::Object,
            "datatype" => RelationKind::Datatype,
            _ => RelationKind::Other(tag),
        }
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        match kind {
            RelationKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Class id (or datatype tag).
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub domain: String,
    /// Class id or `xsd:`-prefixed datatype tag.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub range: String,
    /// Absent means untyped, which is treated like a datatype relation.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::optional_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<RelationKind>,
    /// Functional / inverse flags and similar.
    #[serde(default, deserialize_with = "lenient::bag", skip_serializing_if = "Bag::is_empty")]
    pub constraints: Bag,
    #[serde(default, deserialize_with = "lenient::bag", skip_serializing_if = "Bag::is_empty")]
    pub metadata: Bag,
    #[serde(flatten)]
    pub extra: Bag,
}

impl Relation {
    fn with_kind(
        kind: RelationKind,
        id: impl Into<String>,
        domain: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            domain: domain.into(),
            range: range.into(),
            kind: Some(kind),
            constraints: Bag::new(),
            metadata: Bag::new(),
            extra: Bag::new(),
        }
    }

    pub fn object(
        id: impl Into<String>,
        domain: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Self::with_kind(RelationKind::Object, id, domain, range)
    }

    pub fn datatype(
        id: impl Into<String>,
        domain: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        Self::with_kind(RelationKind::Datatype, id, domain, range)
    }

    /// Only object relations have their domain and range checked against C.
    pub fn is_object(&self) -> bool {
        self.kind == Some(RelationKind::Object)
    }

    pub fn range_term(&self) -> RangeTerm<'_> {
        RangeTerm::classify(&self.range)
    }
}

/// How a relation range is interpreted.
///
/// The scalar/class split rests on the `xsd:` prefix alone. Known XML Schema
/// datatypes are recognised for reporting, but any `xsd:` tag counts as scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeTerm<'a> {
    Datatype {
        tag: &'a str,
        known: Option<XsdDatatype>,
    },
    Class(&'a str),
}

impl<'a> RangeTerm<'a> {
    pub fn classify(range: &'a str) -> Self {
        match range.strip_prefix(SCALAR_TYPE_PREFIX) {
            Some(local) => RangeTerm::Datatype {
                tag: range,
                known: XsdDatatype::from_local_name(local),
            },
            None => RangeTerm::Class(range),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, RangeTerm::Datatype { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XsdDatatype {
    String,
    Boolean,
    Decimal,
    Integer,
    Int,
    Long,
    Double,
    Float,
    Date,
    DateTime,
    Time,
    Duration,
    AnyUri,
}

impl XsdDatatype {
    pub const ALL: [XsdDatatype; 13] = [
        XsdDatatype::String,
        XsdDatatype::Boolean,
        XsdDatatype::Decimal,
        XsdDatatype::Integer,
        XsdDatatype::Int,
        XsdDatatype::Long,
        XsdDatatype::Double,
        XsdDatatype::Float,
        XsdDatatype::Date,
        XsdDatatype::DateTime,
        XsdDatatype::Time,
        XsdDatatype::Duration,
        XsdDatatype::AnyUri,
    ];

    pub fn local_name(self) -> &'static str {
        match self {
            XsdDatatype::String => "string",
            XsdDatatype::Boolean => "boolean",
            XsdDatatype::Decimal => "decimal",
            XsdDatatype::Integer => "integer",
            XsdDatatype::Int => "int",
            XsdDatatype::Long => "long",
            XsdDatatype::Double => "double",
            XsdDatatype::Float => "float",
            XsdDatatype::Date => "date",
            XsdDatatype::DateTime => "dateTime",
            XsdDatatype::Time => "time",
            XsdDatatype::Duration => "duration",
            XsdDatatype::AnyUri => "anyURI",
        }
    }

    pub fn from_local_name(local: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.local_name() == local)
    }

    /// Prefixed tag, e.g. `xsd:dateTime`.
    pub fn tag(self) -> String {
        format!("{SCALAR_TYPE_PREFIX}{}", self.local_name())
    }
}

// ============================================================================
// A: axioms
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axiom {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    /// Open tag: `subClassOf`, `equivalentClass`, `disjointWith`, ...
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "String::is_empty"
    )]
    pub kind: String,
    /// Operation-specific payload, e.g. `{subClass, superClass}`. Ids inside are not checked.
    #[serde(default, deserialize_with = "lenient::bag", skip_serializing_if = "Bag::is_empty")]
    pub statement: Bag,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(flatten)]
    pub extra: Bag,
}

// ============================================================================
// I: instances
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    /// Intended to name a class of the ontology; not validated.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub class_id: String,
    /// Relation id → value, in insertion order. See [`PropertyValue`].
    #[serde(default, deserialize_with = "lenient::bag", skip_serializing_if = "Bag::is_empty")]
    pub properties: Bag,
    #[serde(default, deserialize_with = "lenient::bag", skip_serializing_if = "Bag::is_empty")]
    pub metadata: Bag,
    #[serde(flatten)]
    pub extra: Bag,
}

impl Instance {
    pub fn new(id: impl Into<String>, class_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class_id: class_id.into(),
            properties: Bag::new(),
            metadata: Bag::new(),
            extra: Bag::new(),
        }
    }

    pub fn with_property(mut self, relation: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(relation.into(), value.into());
        self
    }

    /// Shorthand for a `{value, type}` typed literal property.
    pub fn with_typed(
        self,
        relation: impl Into<String>,
        value: impl Into<String>,
        datatype: impl Into<String>,
    ) -> Self {
        let mut record = Bag::new();
        record.insert("value".to_string(), Value::String(value.into()));
        record.insert("type".to_string(), Value::String(datatype.into()));
        self.with_property(relation, Value::Object(record))
    }
}

/// Interpretation of a single instance property value.
///
/// Precedence: a record carrying both `type` and `value` is a typed literal;
/// otherwise a string starting with [`LOCAL_REFERENCE_MARKER`] points to
/// another instance; anything else is a plain literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue<'a> {
    Typed { value: &'a Value, datatype: &'a str },
    Reference(&'a str),
    Literal(&'a Value),
}

impl<'a> PropertyValue<'a> {
    pub fn classify(value: &'a Value) -> Self {
        if let Value::Object(record) = value {
            let datatype = record.get("type").and_then(Value::as_str);
            let inner = record.get("value").filter(|v| !v.is_null());
            if let (Some(datatype), Some(inner)) = (datatype, inner) {
                return PropertyValue::Typed {
                    value: inner,
                    datatype,
                };
            }
        }
        match value.as_str() {
            Some(s) if s.starts_with(LOCAL_REFERENCE_MARKER) => PropertyValue::Reference(s),
            _ => PropertyValue::Literal(value),
        }
    }
}
