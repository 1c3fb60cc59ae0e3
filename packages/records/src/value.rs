//! The Value type - an attribute value.
//!
//! Schema rewriting only renames; values are carried across verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The value of one attribute on a record.
///
/// # Design Notes
///
/// - Uses `BTreeMap` for deterministic ordering (important for comparison)
/// - Serializes untagged, so JSON request files read naturally. A GUID read
///   back from JSON arrives as `Value::String`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer (also option-set codes).
    Integer(i64),
    /// 64-bit floating point (also money and decimals).
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Key-value map with string keys.
    Map(BTreeMap<String, Value>),
    /// A globally unique identifier.
    Guid(Uuid),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer content, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

// Conversion from common types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Guid(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_reads_naturally() {
        let value: Value = serde_json::from_str(r#"{"name": "Acme", "employees": 12}"#).unwrap();

        match value {
            Value::Map(map) => {
                assert_eq!(map.get("name"), Some(&Value::from("Acme")));
                assert_eq!(map.get("employees"), Some(&Value::Integer(12)));
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn null_and_float_from_json() {
        assert_eq!(serde_json::from_str::<Value>("null").unwrap(), Value::Null);
        assert_eq!(
            serde_json::from_str::<Value>("2.5").unwrap(),
            Value::Float(2.5)
        );
    }

    #[test]
    fn guid_serializes_as_string() {
        let id = Uuid::nil();
        let json = serde_json::to_string(&Value::Guid(id)).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(7i64).as_i64(), Some(7));
        assert!(Value::Null.is_null());
        assert_eq!(Value::from(true).as_str(), None);
    }
}
