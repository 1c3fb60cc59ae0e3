//! A name mapper configured from JSON.

use std::collections::BTreeMap;
use std::path::Path;

use schemashim_mapping::{ElementKind, NameMapper};
use serde::{Deserialize, Serialize};

use crate::{load, Error};

/// What to do with a name the configuration does not list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Unlisted names have no external counterpart.
    #[default]
    None,
    /// Unlisted names map to themselves.
    Identity,
}

/// The external names of one native record type and its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityNames {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,
    /// Native attribute name to external attribute name.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Name mapping configuration, keyed by native entity name.
///
/// ```json
/// {
///   "fallback": "none",
///   "entities": {
///     "account": {
///       "external_name": "Customer",
///       "attributes": { "accountid": "CustomerId", "name": "CustomerName" }
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub fallback: Fallback,
    #[serde(default)]
    pub entities: BTreeMap<String, EntityNames>,
}

impl MappingConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let config: Self = load::read_json(path)?;
        config.validate(&path.display().to_string())?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = load::parse_json(json, "mapping configuration")?;
        config.validate("mapping configuration")?;
        Ok(config)
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    fn validate(&self, origin: &str) -> Result<(), Error> {
        for (native, entity) in &self.entities {
            if native.is_empty() || entity.external_name.as_deref() == Some("") {
                return Err(Error::invalid(origin, "empty entity name"));
            }
            if let Some((attribute, _)) = entity
                .attributes
                .iter()
                .find(|(n, e)| n.is_empty() || e.is_empty())
            {
                return Err(Error::invalid(
                    origin,
                    format!("empty name for attribute '{}' of '{}'", attribute, native),
                ));
            }
        }
        Ok(())
    }

    fn fallback(&self, native_name: &str) -> Option<String> {
        match self.fallback {
            Fallback::None => None,
            Fallback::Identity => Some(native_name.to_string()),
        }
    }
}

impl NameMapper for MappingConfig {
    fn external_name(&self, kind: ElementKind<'_>, native_name: &str) -> Option<String> {
        let listed = match kind {
            ElementKind::Entity => self
                .entities
                .get(native_name)
                .and_then(|entity| entity.external_name.clone()),
            ElementKind::Attribute { entity } => self
                .entities
                .get(entity)
                .and_then(|entity| entity.attributes.get(native_name))
                .cloned(),
        };
        listed.or_else(|| self.fallback(native_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CUSTOMER: &str = r#"{
        "entities": {
            "account": {
                "external_name": "Customer",
                "attributes": {"accountid": "CustomerId", "name": "CustomerName"}
            }
        }
    }"#;

    #[test]
    fn listed_names() {
        let config = MappingConfig::from_json_str(CUSTOMER).unwrap();

        assert_eq!(
            config.external_name(ElementKind::Entity, "account"),
            Some("Customer".to_string())
        );
        assert_eq!(
            config.external_name(ElementKind::Attribute { entity: "account" }, "name"),
            Some("CustomerName".to_string())
        );
    }

    #[test]
    fn unlisted_names_follow_fallback() {
        let config = MappingConfig::from_json_str(CUSTOMER).unwrap();
        let statecode = ElementKind::Attribute { entity: "account" };

        assert_eq!(config.fallback, Fallback::None);
        assert_eq!(config.external_name(statecode, "statecode"), None);
        assert_eq!(config.external_name(ElementKind::Entity, "contact"), None);

        let config = config.with_fallback(Fallback::Identity);
        assert_eq!(
            config.external_name(statecode, "statecode"),
            Some("statecode".to_string())
        );
    }

    #[test]
    fn attributes_are_per_entity() {
        let config = MappingConfig::from_json_str(CUSTOMER).unwrap();
        assert_eq!(
            config.external_name(ElementKind::Attribute { entity: "contact" }, "name"),
            None
        );
    }

    #[test]
    fn empty_names_are_rejected() {
        let err = MappingConfig::from_json_str(
            r#"{"entities": {"account": {"attributes": {"name": ""}}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Invalid { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = MappingConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CUSTOMER.as_bytes()).unwrap();

        let config = MappingConfig::from_path(file.path()).unwrap();
        assert_eq!(config.entities.len(), 1);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            MappingConfig::from_path(missing).unwrap_err(),
            Error::Io { .. }
        ));
    }
}
