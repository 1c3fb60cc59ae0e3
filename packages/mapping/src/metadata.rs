//! Record-type metadata and the metadata collaborator.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Platform metadata for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    pub native_name: String,
    #[serde(default)]
    pub is_primary_id: bool,
}

impl AttributeMetadata {
    pub fn new(native_name: impl Into<String>) -> Self {
        Self {
            native_name: native_name.into(),
            is_primary_id: false,
        }
    }

    pub fn primary_id(native_name: impl Into<String>) -> Self {
        Self {
            native_name: native_name.into(),
            is_primary_id: true,
        }
    }
}

/// Platform metadata for one record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTypeMetadata {
    pub native_type_name: String,
    /// The caller-facing type name, when the platform records one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_type_name: Option<String>,
    pub attributes: Vec<AttributeMetadata>,
}

impl RecordTypeMetadata {
    pub fn new(native_type_name: impl Into<String>, attributes: Vec<AttributeMetadata>) -> Self {
        Self {
            native_type_name: native_type_name.into(),
            external_type_name: None,
            attributes,
        }
    }

    pub fn with_external_name(mut self, external_type_name: impl Into<String>) -> Self {
        self.external_type_name = Some(external_type_name.into());
        self
    }
}

/// Looks up record-type metadata.
///
/// `type_name` is the name a request uses for the type; implementations
/// resolve it in whichever vocabulary they index. Failures are returned as
/// [`Error::Metadata`] and are never retried by the caller.
pub trait MetadataSource: Send + Sync {
    fn record_type(&self, type_name: &str) -> Result<RecordTypeMetadata, Error>;
}

impl<T: MetadataSource + ?Sized> MetadataSource for &T {
    fn record_type(&self, type_name: &str) -> Result<RecordTypeMetadata, Error> {
        (**self).record_type(type_name)
    }
}

impl<T: MetadataSource + ?Sized> MetadataSource for Box<T> {
    fn record_type(&self, type_name: &str) -> Result<RecordTypeMetadata, Error> {
        self.as_ref().record_type(type_name)
    }
}
