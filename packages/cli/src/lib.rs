//! # schemashim-cli
//!
//! Inspect entity maps and dry-run request translation from JSON files.
//!
//! ## Usage
//!
//! ```bash
//! # Show how a record type's names map
//! schemashim describe --metadata metadata.json --mapping mapping.json Customer
//!
//! # Rewrite a pipeline message into the backing store's vocabulary
//! schemashim translate --metadata metadata.json --mapping mapping.json request.json
//! ```
//!
//! Without `--mapping`, every name maps to itself.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use schemashim_adapter::{Adapter, AdapterConfig, Message, Request};
use schemashim_json_store::{JsonMetadata, MappingConfig};
use schemashim_mapping::{
    Direction, EntityMapFactory, IdentityMapper, MetadataSource, NameMapper,
};
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] schemashim_json_store::Error),

    #[error(transparent)]
    Mapping(#[from] schemashim_mapping::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse request: {0}")]
    Request(#[from] serde_json::Error),
}

/// The metadata catalog and name mapper a command runs with.
pub struct Sources {
    pub metadata: JsonMetadata,
    pub mapper: Box<dyn NameMapper>,
}

impl Sources {
    pub fn load(metadata: &Path, mapping: Option<&Path>) -> Result<Self, Error> {
        let catalog = JsonMetadata::from_path(metadata)?;
        let mapper: Box<dyn NameMapper> = match mapping {
            Some(path) => Box::new(MappingConfig::from_path(path)?),
            None => Box::new(IdentityMapper),
        };
        let metadata = catalog.with_mapper_names(mapper.as_ref())?;
        debug!(
            record_types = metadata.record_types().len(),
            mapped = mapping.is_some(),
            "loaded sources"
        );
        Ok(Self { metadata, mapper })
    }

    pub fn into_adapter(self, config: AdapterConfig) -> Adapter {
        Adapter::from_parts(Box::new(self.metadata), self.mapper, config)
    }
}

/// Render the entity map of one record type, one attribute per line.
///
/// The primary id is marked with `*`.
pub fn describe(
    metadata: &dyn MetadataSource,
    mapper: &dyn NameMapper,
    type_name: &str,
) -> Result<String, Error> {
    let record_type = metadata.record_type(type_name)?;
    let map = EntityMapFactory::new(mapper).create(&record_type, None)?;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} <- {}",
        map.type_name(Direction::ToExternal),
        map.type_name(Direction::ToNative)
    );
    for attribute in map.attributes() {
        let marker = if attribute.is_primary_id() { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "  {} {} <- {}",
            marker,
            attribute.names().external(),
            attribute.names().native()
        );
    }
    let skipped: Vec<&str> = record_type
        .attributes
        .iter()
        .map(|a| a.native_name.as_str())
        .filter(|native| map.attribute(native, Direction::ToExternal).is_none())
        .collect();
    if !skipped.is_empty() {
        let _ = writeln!(out, "  unmapped: {}", skipped.join(", "));
    }
    Ok(out)
}

/// Rewrite a pipeline message (JSON) into backing-store vocabulary and
/// return the native request as pretty JSON. Nothing is executed.
pub fn translate(adapter: &Adapter, message_json: &str) -> Result<String, Error> {
    let message: Message = serde_json::from_str(message_json)?;
    let request = Request::try_from(message)?;
    let prepared = adapter.prepare(request)?;
    Ok(serde_json::to_string_pretty(prepared.request())?)
}

pub fn read_file(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemashim_mapping::ErrorKind;
    use std::io::Write;

    const METADATA: &str = r#"{
        "record_types": [{
            "native_type_name": "account",
            "attributes": [
                {"native_name": "accountid", "is_primary_id": true},
                {"native_name": "name"},
                {"native_name": "statecode"}
            ]
        }]
    }"#;

    const MAPPING: &str = r#"{
        "entities": {
            "account": {
                "external_name": "Customer",
                "attributes": {"accountid": "CustomerId", "name": "CustomerName"}
            }
        }
    }"#;

    fn file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn sources() -> Sources {
        let metadata = file(METADATA);
        let mapping = file(MAPPING);
        Sources::load(metadata.path(), Some(mapping.path())).unwrap()
    }

    #[test]
    fn describe_marks_primary_id_and_unmapped() {
        let sources = sources();
        let out = describe(&sources.metadata, sources.mapper.as_ref(), "Customer").unwrap();

        assert_eq!(
            out,
            "Customer <- account\n  * CustomerId <- accountid\n    CustomerName <- name\n  unmapped: statecode\n"
        );
    }

    #[test]
    fn describe_with_identity_mapper() {
        let metadata = file(METADATA);
        let sources = Sources::load(metadata.path(), None).unwrap();

        let out = describe(&sources.metadata, sources.mapper.as_ref(), "account").unwrap();
        assert!(out.starts_with("account <- account\n"));
        assert!(!out.contains("unmapped"));
    }

    #[test]
    fn translate_retrieve() {
        let adapter = sources().into_adapter(AdapterConfig::default());
        let out = translate(
            &adapter,
            r#"{
                "name": "Retrieve",
                "parameters": {
                    "Target": {"reference": {"type_name": "Customer", "id": "123"}},
                    "ColumnSet": {"column_set": {"columns": ["CustomerName"]}}
                }
            }"#,
        )
        .unwrap();

        let native: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(native["message"], "Retrieve");
        assert_eq!(native["target"]["type_name"], "account");
        assert_eq!(native["target"]["id"], "123");
        assert_eq!(native["columns"]["columns"][0], "name");
    }

    #[test]
    fn translate_unknown_message() {
        let adapter = sources().into_adapter(AdapterConfig::default());
        let err = translate(&adapter, r#"{"name": "Assign"}"#).unwrap_err();

        match err {
            Error::Mapping(e) => assert_eq!(e.kind(), ErrorKind::Unsupported),
            other => panic!("expected a mapping error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file() {
        let Err(err) = Sources::load(Path::new("/nonexistent/metadata.json"), None) else {
            panic!("expected a missing metadata file to fail");
        };
        assert!(matches!(err, Error::Config(_)));
    }
}
