//! The RecordCollection type - one page of records.

use serde::{Deserialize, Serialize};

use crate::{Record, Value};

/// A page of records of one type, plus continuation metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordCollection {
    pub type_name: String,
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub more_records: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_cookie: Option<String>,
    /// `-1` when the total was not requested.
    #[serde(default = "unknown_total")]
    pub total_record_count: i64,
    #[serde(default)]
    pub total_record_count_limit_exceeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_active_row_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_data: Option<Value>,
}

fn unknown_total() -> i64 {
    -1
}

impl RecordCollection {
    /// Create an empty, complete page.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            records: Vec::new(),
            more_records: false,
            paging_cookie: None,
            total_record_count: unknown_total(),
            total_record_count_limit_exceeded: false,
            min_active_row_version: None,
            extension_data: None,
        }
    }

    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.records = records;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_collection_has_unknown_total() {
        let c = RecordCollection::new("account");
        assert_eq!(c.total_record_count, -1);
        assert!(c.is_empty());
        assert!(!c.more_records);
    }

    #[test]
    fn missing_total_defaults_when_deserializing() {
        let c: RecordCollection =
            serde_json::from_str(r#"{"type_name": "account", "records": []}"#).unwrap();
        assert_eq!(c.total_record_count, -1);
    }
}
