//! A record-type metadata catalog loaded from JSON.

use std::collections::HashMap;
use std::path::Path;

use schemashim_mapping::{ElementKind, MetadataSource, NameMapper, RecordTypeMetadata};
use serde::{Deserialize, Serialize};

use crate::{load, Error};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Catalog {
    #[serde(default)]
    record_types: Vec<RecordTypeMetadata>,
}

/// Record-type metadata looked up by native or external type name.
///
/// ```json
/// {
///   "record_types": [
///     {
///       "native_type_name": "account",
///       "external_type_name": "Customer",
///       "attributes": [
///         {"native_name": "accountid", "is_primary_id": true},
///         {"native_name": "name"}
///       ]
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonMetadata {
    record_types: Vec<RecordTypeMetadata>,
    index: HashMap<String, usize>,
}

impl JsonMetadata {
    pub fn new(record_types: Vec<RecordTypeMetadata>) -> Result<Self, Error> {
        Self::indexed(record_types, "metadata catalog")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let catalog: Catalog = load::read_json(path)?;
        Self::indexed(catalog.record_types, &path.display().to_string())
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let catalog: Catalog = load::parse_json(json, "metadata catalog")?;
        Self::new(catalog.record_types)
    }

    fn indexed(record_types: Vec<RecordTypeMetadata>, origin: &str) -> Result<Self, Error> {
        let mut metadata = Self {
            record_types,
            index: HashMap::new(),
        };
        for i in 0..metadata.record_types.len() {
            let native = metadata.record_types[i].native_type_name.clone();
            metadata.add_name(native, i, origin)?;
            if let Some(external) = metadata.record_types[i].external_type_name.clone() {
                metadata.add_name(external, i, origin)?;
            }
        }
        Ok(metadata)
    }

    /// Also index every record type under the external name `mapper`
    /// gives it, so requests in caller vocabulary resolve.
    pub fn with_mapper_names(mut self, mapper: &dyn NameMapper) -> Result<Self, Error> {
        for i in 0..self.record_types.len() {
            let native = &self.record_types[i].native_type_name;
            if let Some(external) = mapper.external_name(ElementKind::Entity, native) {
                self.add_name(external, i, "name mapping")?;
            }
        }
        Ok(self)
    }

    pub fn record_types(&self) -> &[RecordTypeMetadata] {
        &self.record_types
    }

    fn add_name(&mut self, name: String, index: usize, origin: &str) -> Result<(), Error> {
        if name.is_empty() {
            return Err(Error::invalid(origin, "empty record type name"));
        }
        match self.index.get(&name) {
            Some(&existing) if existing != index => Err(Error::invalid(
                origin,
                format!(
                    "'{}' names both '{}' and '{}'",
                    name,
                    self.record_types[existing].native_type_name,
                    self.record_types[index].native_type_name
                ),
            )),
            Some(_) => Ok(()),
            None => {
                self.index.insert(name, index);
                Ok(())
            }
        }
    }
}

impl MetadataSource for JsonMetadata {
    fn record_type(&self, type_name: &str) -> Result<RecordTypeMetadata, schemashim_mapping::Error> {
        match self.index.get(type_name) {
            Some(&i) => Ok(self.record_types[i].clone()),
            None => Err(Error::UnknownRecordType {
                type_name: type_name.to_string(),
            }
            .into()),
        }
    }
}
