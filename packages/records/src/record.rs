//! The Record type - one instance of a business entity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{RecordId, Value};

/// Attribute values of a record, keyed by attribute name.
pub type Attributes = BTreeMap<String, Value>;

/// Change-tracking state attached to a record by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    Created,
    Changed,
}

/// Marker for a large-value (file) attribute whose content is fetched lazily.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LazyFileAttribute {
    pub key: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

/// One record: a type name, an identifier and named attribute values.
///
/// Besides the attributes, a record carries metadata: a row version and
/// extension data, plus formatted values and a lazy-file marker keyed by
/// attribute name.
///
/// # Example
///
/// ```rust
/// use schemashim_records::{Record, Value};
///
/// let record = Record::new("account")
///     .with_id("123")
///     .with_attribute("name", Value::from("Acme"));
///
/// assert_eq!(record.get("name"), Some(&Value::from("Acme")));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub formatted_values: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RecordState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy_file: Option<LazyFileAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_data: Option<Value>,
}

impl Record {
    /// Create an empty record of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_row_version(mut self, row_version: impl Into<String>) -> Self {
        self.row_version = Some(row_version.into());
        self
    }

    /// Get an attribute value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}
