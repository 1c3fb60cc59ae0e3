//! The RecordReference type - a pointer to a record.

use serde::{Deserialize, Serialize};

use crate::{Attributes, RecordId, Value};

/// A lightweight pointer to a record: its type name plus either its
/// identifier or a set of alternate-key attribute values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordReference {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_attributes: Option<Attributes>,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_data: Option<Value>,
}

impl RecordReference {
    /// Create a reference by identifier.
    pub fn new(type_name: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self {
            type_name: type_name.into(),
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Create a reference by alternate key.
    pub fn by_key(type_name: impl Into<String>, key_attributes: Attributes) -> Self {
        Self {
            type_name: type_name.into(),
            key_attributes: Some(key_attributes),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;

    #[test]
    fn by_id() {
        let r = RecordReference::new("account", "123");
        assert_eq!(r.id, Some(RecordId::from("123")));
        assert!(r.key_attributes.is_none());
    }

    #[test]
    fn by_alternate_key() {
        let r = RecordReference::by_key(
            "account",
            btree! { "accountnumber".to_string() => Value::from("A-1") },
        );
        assert_eq!(r.id, None);
        assert_eq!(
            r.key_attributes.unwrap().get("accountnumber"),
            Some(&Value::from("A-1"))
        );
    }
}
