//! QueryMap: a tree of entity maps shaped like a query's joins.

use std::collections::{BTreeMap, HashSet};

use schemashim_records::{LinkEntity, QueryExpression};

use crate::{EntityMap, EntityMapFactory, Error, MetadataSource, NameMapper};

/// The name mapping of a whole query: the primary entity, plus one child
/// map per link entity, keyed by join alias.
///
/// Built fresh for each query and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMap {
    primary: EntityMap,
    joins: BTreeMap<String, QueryMap>,
}

impl QueryMap {
    /// A query map with no joins.
    pub fn new(primary: EntityMap) -> Self {
        Self {
            primary,
            joins: BTreeMap::new(),
        }
    }

    /// Add a join. Each alias may appear once per level.
    pub fn with_join(mut self, alias: impl Into<String>, join: QueryMap) -> Result<Self, Error> {
        let alias = alias.into();
        if self.joins.contains_key(&alias) {
            return Err(Error::AmbiguousJoin { alias });
        }
        self.joins.insert(alias, join);
        Ok(self)
    }

    pub fn primary(&self) -> &EntityMap {
        &self.primary
    }

    pub fn joins(&self) -> &BTreeMap<String, QueryMap> {
        &self.joins
    }

    /// The direct child joined under `alias`.
    pub fn join(&self, alias: &str) -> Result<&QueryMap, Error> {
        self.joins.get(alias).ok_or_else(|| Error::UnknownJoin {
            alias: alias.to_string(),
        })
    }

    /// Find the join named `alias` anywhere below this map, depth first.
    pub fn find(&self, alias: &str) -> Option<&QueryMap> {
        if let Some(join) = self.joins.get(alias) {
            return Some(join);
        }
        self.joins.values().find_map(|join| join.find(alias))
    }

    /// Join nesting depth; `0` for a map without joins.
    pub fn depth(&self) -> usize {
        self.joins
            .values()
            .map(|join| join.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Builds a [`QueryMap`] for a query by resolving metadata for the primary
/// entity and, recursively, for every link entity.
pub struct QueryMapFactory<'a> {
    metadata: &'a dyn MetadataSource,
    entities: EntityMapFactory<'a>,
}

impl<'a> QueryMapFactory<'a> {
    pub fn new(metadata: &'a dyn MetadataSource, mapper: &'a dyn NameMapper) -> Self {
        Self {
            metadata,
            entities: EntityMapFactory::new(mapper),
        }
    }

    /// The entity map factory this query map factory builds with.
    pub fn entities(&self) -> EntityMapFactory<'a> {
        self.entities
    }

    /// Build the query map for `query`.
    ///
    /// Join aliases must be unique across the whole query, since qualified
    /// conditions and orders may name a join at any depth. Metadata
    /// failures are returned unchanged.
    pub fn create(&self, query: &QueryExpression) -> Result<QueryMap, Error> {
        let metadata = self.metadata.record_type(&query.entity_name)?;
        let primary = self.entities.create(&metadata, None)?;
        let mut aliases = HashSet::new();
        self.add_joins(QueryMap::new(primary), &query.link_entities, &mut aliases)
    }

    fn create_link(
        &self,
        link: &LinkEntity,
        aliases: &mut HashSet<String>,
    ) -> Result<QueryMap, Error> {
        let metadata = self.metadata.record_type(&link.link_to_entity_name)?;
        let primary = self.entities.create(&metadata, link.entity_alias.as_deref())?;
        self.add_joins(QueryMap::new(primary), &link.link_entities, aliases)
    }

    fn add_joins(
        &self,
        mut map: QueryMap,
        links: &[LinkEntity],
        aliases: &mut HashSet<String>,
    ) -> Result<QueryMap, Error> {
        for link in links {
            if !aliases.insert(link.key().to_string()) {
                return Err(Error::AmbiguousJoin {
                    alias: link.key().to_string(),
                });
            }
            map = map.with_join(link.key(), self.create_link(link, aliases)?)?;
        }
        Ok(map)
    }
}
