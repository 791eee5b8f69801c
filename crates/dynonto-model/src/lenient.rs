//! Tolerant field readers for ontology JSON.
//!
//! Structural validation looks only at identity, the four collections and
//! relation references. A document it accepts may still carry a number where
//! text is expected, a `null` bag or a bare string among the classes. These
//! readers map such values onto the typed model instead of rejecting the
//! whole document, so anything that validates also loads.

use crate::ontology::Bag;
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

/// Text form of a scalar field: strings as-is, `null` as empty, anything else
/// as its JSON text.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Text form of an optional field; absent reads as empty.
pub fn field_text(value: Option<&Value>) -> String {
    value.map(text_of).unwrap_or_default()
}

pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| text_of(&v))
}

/// `null` reads as absent; anything else through its text form.
pub(crate) fn optional_tag<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(T::from(text_of(&other))),
    })
}

/// A list of ids. A lone id is accepted as a one-element list.
pub(crate) fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().map(text_of).collect(),
        Value::Null => Vec::new(),
        other => vec![text_of(&other)],
    })
}

/// Schema-free bag. Anything but an object reads as empty.
pub(crate) fn bag<'de, D>(deserializer: D) -> Result<Bag, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Bag::new(),
    })
}

/// Entity collection. `null` reads as empty and entries that are not objects
/// are skipped; they carry no id the validator could see either.
pub(crate) fn entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    items
        .into_iter()
        .filter(Value::is_object)
        .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_of_scalars() {
        assert_eq!(text_of(&json!("Person")), "Person");
        assert_eq!(text_of(&json!(42)), "42");
        assert_eq!(text_of(&json!(true)), "true");
        assert_eq!(text_of(&Value::Null), "");
        assert_eq!(field_text(None), "");
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "text_list")]
        parents: Vec<String>,
        #[serde(default, deserialize_with = "bag")]
        extra: Bag,
    }

    #[test]
    fn lone_id_and_null_bag() {
        let p: Holder = serde_json::from_value(json!({"parents": "Person", "extra": null})).unwrap();
        assert_eq!(p.parents, ["Person"]);
        assert!(p.extra.is_empty());

        let p: Holder = serde_json::from_value(json!({"parents": null, "extra": [1]})).unwrap();
        assert!(p.parents.is_empty());
        assert!(p.extra.is_empty());
    }
}
