//! EntityMap: the name mapping of one record type, and the factory that
//! builds it from platform metadata.

use std::collections::HashMap;

use tracing::trace;

use crate::{
    AttributeMap, Direction, ElementKind, Error, NameMap, NameMapper, RecordTypeMetadata,
};

/// The name mapping of one record type.
///
/// Attribute native names are unique, and so are attribute external names:
/// the mapping is one-to-one in both directions. At most one attribute is
/// the primary id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMap {
    names: NameMap,
    attributes: Vec<AttributeMap>,
    alias: Option<String>,
    by_native: HashMap<String, usize>,
    by_external: HashMap<String, usize>,
}

impl EntityMap {
    /// Build an entity map, checking the one-to-one invariant.
    pub fn new(
        names: NameMap,
        attributes: Vec<AttributeMap>,
        alias: Option<String>,
    ) -> Result<Self, Error> {
        let mut by_native = HashMap::with_capacity(attributes.len());
        let mut by_external = HashMap::with_capacity(attributes.len());
        let mut primary: Option<&str> = None;

        for (index, attribute) in attributes.iter().enumerate() {
            let attr_names = attribute.names();
            if by_native
                .insert(attr_names.native().to_string(), index)
                .is_some()
            {
                return Err(Error::configuration(format!(
                    "attribute '{}' of '{}' is mapped more than once",
                    attr_names.native(),
                    names.native()
                )));
            }
            if by_external
                .insert(attr_names.external().to_string(), index)
                .is_some()
            {
                return Err(Error::configuration(format!(
                    "more than one attribute of '{}' maps to external name '{}'",
                    names.native(),
                    attr_names.external()
                )));
            }
            if attribute.is_primary_id() {
                if let Some(existing) = primary {
                    return Err(Error::configuration(format!(
                        "'{}' has two primary id attributes: '{}' and '{}'",
                        names.native(),
                        existing,
                        attr_names.native()
                    )));
                }
                primary = Some(attr_names.native());
            }
        }

        Ok(Self {
            names,
            attributes,
            alias,
            by_native,
            by_external,
        })
    }

    pub fn names(&self) -> &NameMap {
        &self.names
    }

    /// The type name a rewrite in `direction` produces.
    pub fn type_name(&self, direction: Direction) -> &str {
        self.names.target(direction)
    }

    pub fn attributes(&self) -> &[AttributeMap] {
        &self.attributes
    }

    /// The explicit join alias. `None` for the primary entity and for
    /// joins addressed by their type name.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn primary_id(&self) -> Option<&AttributeMap> {
        self.attributes.iter().find(|a| a.is_primary_id())
    }

    /// Find an attribute by the name a rewrite in `direction` reads.
    pub fn attribute(&self, source_name: &str, direction: Direction) -> Option<&AttributeMap> {
        let index = match direction {
            Direction::ToNative => self.by_external.get(source_name),
            Direction::ToExternal => self.by_native.get(source_name),
        };
        index.map(|&i| &self.attributes[i])
    }

    /// Map an attribute name, failing if it has no counterpart.
    pub fn map_attribute(&self, source_name: &str, direction: Direction) -> Result<&str, Error> {
        self.attribute(source_name, direction)
            .map(|a| a.names().target(direction))
            .ok_or_else(|| Error::UnknownAttribute {
                entity: self.names.source(direction).to_string(),
                attribute: source_name.to_string(),
            })
    }
}

/// Builds [`EntityMap`]s from record-type metadata and a name mapper.
#[derive(Clone, Copy)]
pub struct EntityMapFactory<'a> {
    mapper: &'a dyn NameMapper,
}

impl<'a> EntityMapFactory<'a> {
    pub fn new(mapper: &'a dyn NameMapper) -> Self {
        Self { mapper }
    }

    /// Build the entity map for one record type.
    ///
    /// The record type's external name comes from the mapper, or from the
    /// metadata when the mapper has none. Every attribute the mapper can
    /// name becomes an [`AttributeMap`]; attributes it cannot name are left
    /// out, except the primary id, which must be mappable.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] when the metadata reports no primary id (or
    /// several), when the type or primary id has no external name, or when
    /// two attributes end up with the same external name.
    pub fn create(
        &self,
        metadata: &RecordTypeMetadata,
        alias: Option<&str>,
    ) -> Result<EntityMap, Error> {
        let native_type = metadata.native_type_name.as_str();
        let external_type = self
            .mapper
            .external_name(ElementKind::Entity, native_type)
            .or_else(|| metadata.external_type_name.clone())
            .ok_or_else(|| {
                Error::configuration(format!("record type '{}' has no external name", native_type))
            })?;
        let names = NameMap::new(native_type, external_type)?;

        match metadata.attributes.iter().filter(|a| a.is_primary_id).count() {
            1 => {}
            0 => {
                return Err(Error::configuration(format!(
                    "record type '{}' reports no primary id attribute",
                    native_type
                )))
            }
            n => {
                return Err(Error::configuration(format!(
                    "record type '{}' reports {} primary id attributes",
                    native_type, n
                )))
            }
        }

        let kind = ElementKind::Attribute {
            entity: native_type,
        };
        let mut attributes = Vec::with_capacity(metadata.attributes.len());
        for attribute in &metadata.attributes {
            match self.mapper.external_name(kind, &attribute.native_name) {
                Some(external) => {
                    trace!(
                        entity = native_type,
                        native = %attribute.native_name,
                        external = %external,
                        primary_id = attribute.is_primary_id,
                        "attribute map"
                    );
                    attributes.push(AttributeMap::new(
                        NameMap::new(attribute.native_name.as_str(), external)?,
                        attribute.is_primary_id,
                    ));
                }
                None if attribute.is_primary_id => {
                    return Err(Error::configuration(format!(
                        "primary id attribute '{}' of '{}' has no external name",
                        attribute.native_name, native_type
                    )));
                }
                None => {
                    trace!(
                        entity = native_type,
                        native = %attribute.native_name,
                        "attribute has no external name, skipped"
                    );
                }
            }
        }

        EntityMap::new(names, attributes, alias.map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttributeMetadata, ErrorKind, IdentityMapper};

    fn customer_names(kind: ElementKind<'_>, native: &str) -> Option<String> {
        let external = match (kind, native) {
            (ElementKind::Entity, "account") => "Customer",
            (ElementKind::Attribute { .. }, "accountid") => "CustomerId",
            (ElementKind::Attribute { .. }, "name") => "CustomerName",
            (ElementKind::Attribute { .. }, "revenue") => "Revenue",
            _ => return None,
        };
        Some(external.to_string())
    }

    fn account_metadata() -> RecordTypeMetadata {
        RecordTypeMetadata::new(
            "account",
            vec![
                AttributeMetadata::primary_id("accountid"),
                AttributeMetadata::new("name"),
                AttributeMetadata::new("revenue"),
                AttributeMetadata::new("statecode"),
            ],
        )
    }

    #[test]
    fn builds_from_metadata() {
        let map = EntityMapFactory::new(&customer_names)
            .create(&account_metadata(), None)
            .unwrap();

        assert_eq!(map.names(), &NameMap::new("account", "Customer").unwrap());
        assert_eq!(map.alias(), None);
        // statecode has no external name and is left out
        assert_eq!(map.attributes().len(), 3);
        assert_eq!(map.primary_id().unwrap().names().external(), "CustomerId");
        assert_eq!(
            map.map_attribute("CustomerName", Direction::ToNative).unwrap(),
            "name"
        );
        assert_eq!(
            map.map_attribute("name", Direction::ToExternal).unwrap(),
            "CustomerName"
        );
    }

    #[test]
    fn keeps_metadata_order() {
        let map = EntityMapFactory::new(&IdentityMapper)
            .create(&account_metadata(), Some("a"))
            .unwrap();

        let natives: Vec<&str> = map.attributes().iter().map(|a| a.names().native()).collect();
        assert_eq!(natives, vec!["accountid", "name", "revenue", "statecode"]);
        assert_eq!(map.alias(), Some("a"));
    }

    #[test]
    fn unknown_attribute_is_lookup_failure() {
        let map = EntityMapFactory::new(&customer_names)
            .create(&account_metadata(), None)
            .unwrap();

        let err = map.map_attribute("statecode", Direction::ToNative).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn falls_back_to_metadata_type_name() {
        fn attributes_only(kind: ElementKind<'_>, native: &str) -> Option<String> {
            match kind {
                ElementKind::Entity => None,
                ElementKind::Attribute { .. } => Some(native.to_string()),
            }
        }

        let metadata = account_metadata().with_external_name("Client");
        let map = EntityMapFactory::new(&attributes_only)
            .create(&metadata, None)
            .unwrap();
        assert_eq!(map.type_name(Direction::ToExternal), "Client");

        let err = EntityMapFactory::new(&attributes_only)
            .create(&account_metadata(), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn duplicate_external_names_fail() {
        fn collapsing(kind: ElementKind<'_>, native: &str) -> Option<String> {
            match (kind, native) {
                (ElementKind::Attribute { .. }, "name" | "revenue") => Some("Value".to_string()),
                _ => Some(native.to_string()),
            }
        }

        let err = EntityMapFactory::new(&collapsing)
            .create(&account_metadata(), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(format!("{}", err).contains("Value"));
    }

    #[test]
    fn unmappable_primary_id_fails() {
        fn no_id(kind: ElementKind<'_>, native: &str) -> Option<String> {
            match (kind, native) {
                (ElementKind::Attribute { .. }, "accountid") => None,
                _ => Some(native.to_string()),
            }
        }

        let err = EntityMapFactory::new(&no_id)
            .create(&account_metadata(), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(format!("{}", err).contains("accountid"));
    }

    #[test]
    fn missing_or_repeated_primary_id_fails() {
        let none = RecordTypeMetadata::new("account", vec![AttributeMetadata::new("name")]);
        assert_eq!(
            EntityMapFactory::new(&IdentityMapper)
                .create(&none, None)
                .unwrap_err()
                .kind(),
            ErrorKind::Configuration
        );

        let two = RecordTypeMetadata::new(
            "account",
            vec![
                AttributeMetadata::primary_id("accountid"),
                AttributeMetadata::primary_id("altid"),
            ],
        );
        assert_eq!(
            EntityMapFactory::new(&IdentityMapper)
                .create(&two, None)
                .unwrap_err()
                .kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn duplicate_native_names_fail() {
        let names = NameMap::new("account", "Customer").unwrap();
        let attrs = vec![
            AttributeMap::new(NameMap::new("name", "A").unwrap(), false),
            AttributeMap::new(NameMap::new("name", "B").unwrap(), false),
        ];
        assert!(EntityMap::new(names, attrs, None).is_err());
    }
}
