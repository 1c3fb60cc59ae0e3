//! Schema rewriting: translate boundary values between the caller's
//! vocabulary and the backing store's.
//!
//! Only names are rewritten. Identifiers, attribute values and every piece
//! of metadata without schema-dependent names (row versions, paging
//! cookies, extension data, ...) are copied verbatim. Metadata keyed by
//! attribute name follows the attribute drop rule.

use schemashim_records::{
    Attributes, ColumnSet, ConditionExpression, FilterExpression, LinkEntity, OrderExpression,
    LazyFileAttribute, QueryExpression, Record, RecordCollection, RecordId, RecordReference,
    Value,
};
use tracing::trace;

use crate::{AttributeMap, Direction, EntityMap, Error, QueryMap};

/// Rewrite a column projection, preserving its order.
///
/// Every listed attribute must have a mapping; an unmapped name fails with
/// [`Error::UnknownAttribute`] rather than being passed through.
pub fn rewrite_columns(
    columns: ColumnSet,
    entity_map: &EntityMap,
    direction: Direction,
) -> Result<ColumnSet, Error> {
    match columns {
        ColumnSet::All => Ok(ColumnSet::All),
        ColumnSet::Columns(columns) => columns
            .iter()
            .map(|column| {
                entity_map
                    .map_attribute(column, direction)
                    .map(str::to_string)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ColumnSet::Columns),
    }
}

/// Rewrite a record reference: its type name and alternate-key names.
pub fn rewrite_reference(
    reference: RecordReference,
    entity_map: &EntityMap,
    direction: Direction,
) -> Result<RecordReference, Error> {
    let RecordReference {
        type_name: _,
        id,
        key_attributes,
        name,
        row_version,
        extension_data,
    } = reference;

    let key_attributes = match key_attributes {
        Some(keys) => Some(
            keys.into_iter()
                .map(|(key, value)| {
                    let key = entity_map.map_attribute(&key, direction)?.to_string();
                    Ok((key, value))
                })
                .collect::<Result<Attributes, Error>>()?,
        ),
        None => None,
    };

    Ok(RecordReference {
        type_name: entity_map.type_name(direction).to_string(),
        id,
        key_attributes,
        name,
        row_version,
        extension_data,
    })
}

/// Rewrite attribute names, dropping attributes without a mapping.
pub fn rewrite_attributes(
    attributes: Attributes,
    entity_map: &EntityMap,
    direction: Direction,
) -> Attributes {
    attributes
        .into_iter()
        .filter_map(|(name, value)| match mapped_name(entity_map, &name, direction) {
            Some(target) => Some((target, value)),
            None => {
                trace!(
                    entity = entity_map.names().source(direction),
                    attribute = %name,
                    "dropping unmapped attribute"
                );
                None
            }
        })
        .collect()
}

fn mapped_name(entity_map: &EntityMap, name: &str, direction: Direction) -> Option<String> {
    entity_map
        .attribute(name, direction)
        .map(|attribute| attribute.names().target(direction).to_string())
}

/// Rewrite a record.
///
/// Attributes without a mapping are dropped, and so are their formatted
/// values and lazy-file marker. When rewriting towards the caller, the
/// record identifier is taken from the primary-id attribute if the record
/// carries one; otherwise the identifier is kept as is.
pub fn rewrite_record(
    record: Record,
    entity_map: &EntityMap,
    direction: Direction,
) -> Result<Record, Error> {
    let Record {
        type_name: _,
        id,
        attributes,
        formatted_values,
        row_version,
        state,
        lazy_file,
        extension_data,
    } = record;

    let id = match (direction, entity_map.primary_id()) {
        (Direction::ToExternal, Some(primary)) => {
            match attributes.get(primary.names().source(direction)) {
                Some(value) => record_id(primary, value)?.or(id),
                None => id,
            }
        }
        _ => id,
    };

    let formatted_values = formatted_values
        .into_iter()
        .filter_map(|(name, text)| Some((mapped_name(entity_map, &name, direction)?, text)))
        .collect();
    let lazy_file = lazy_file.and_then(|file| rewrite_lazy_file(file, entity_map, direction));

    Ok(Record {
        type_name: entity_map.type_name(direction).to_string(),
        id,
        attributes: rewrite_attributes(attributes, entity_map, direction),
        formatted_values,
        row_version,
        state,
        lazy_file,
        extension_data,
    })
}

fn rewrite_lazy_file(
    file: LazyFileAttribute,
    entity_map: &EntityMap,
    direction: Direction,
) -> Option<LazyFileAttribute> {
    let LazyFileAttribute {
        key,
        value,
        size_key,
        size,
    } = file;

    let Some(key) = mapped_name(entity_map, &key, direction) else {
        trace!(
            entity = entity_map.names().source(direction),
            attribute = %key,
            "dropping lazy-file marker of unmapped attribute"
        );
        return None;
    };
    Some(LazyFileAttribute {
        key,
        value,
        size_key: size_key.and_then(|name| mapped_name(entity_map, &name, direction)),
        size,
    })
}

fn record_id(attribute: &AttributeMap, value: &Value) -> Result<Option<RecordId>, Error> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(RecordId::new(s.as_str()))),
        Value::Guid(guid) => Ok(Some(RecordId::from(*guid))),
        Value::Integer(i) => Ok(Some(RecordId::new(i.to_string()))),
        other => Err(Error::InvalidValue {
            attribute: attribute.names().native().to_string(),
            message: format!("{:?} cannot be used as a record identifier", other),
        }),
    }
}

/// Rewrite a page of records using the query map's primary entity.
///
/// Link-entity data attached to individual records is not rewritten.
pub fn rewrite_collection(
    collection: RecordCollection,
    query_map: &QueryMap,
    direction: Direction,
) -> Result<RecordCollection, Error> {
    let RecordCollection {
        type_name: _,
        records,
        more_records,
        paging_cookie,
        total_record_count,
        total_record_count_limit_exceeded,
        min_active_row_version,
        extension_data,
    } = collection;

    let primary = query_map.primary();
    let records = records
        .into_iter()
        .map(|record| rewrite_record(record, primary, direction))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecordCollection {
        type_name: primary.type_name(direction).to_string(),
        records,
        more_records,
        paging_cookie,
        total_record_count,
        total_record_count_limit_exceeded,
        min_active_row_version,
        extension_data,
    })
}

/// Rewrite a query tree.
///
/// The entity name, column projections, link entities (matched to the query
/// map's joins by alias), filter conditions, and orderings are all
/// rewritten. Conditions and orderings qualified with a link-entity alias
/// resolve against that join wherever it sits in the tree. Any attribute
/// without a mapping fails the whole rewrite; nothing is partially mapped.
pub fn rewrite_query(
    query: QueryExpression,
    query_map: &QueryMap,
    direction: Direction,
) -> Result<QueryExpression, Error> {
    let QueryExpression {
        entity_name: _,
        columns,
        criteria,
        link_entities,
        orders,
        distinct,
        no_lock,
        top_count,
        page_info,
        query_hints,
        extension_data,
    } = query;

    let scope = Scope {
        root: query_map,
        current: query_map,
        direction,
    };
    let primary = query_map.primary();

    Ok(QueryExpression {
        entity_name: primary.type_name(direction).to_string(),
        columns: rewrite_columns(columns, primary, direction)?,
        criteria: scope.filter(criteria)?,
        link_entities: scope.links(link_entities)?,
        orders: scope.orders(orders)?,
        distinct,
        no_lock,
        top_count,
        page_info,
        query_hints,
        extension_data,
    })
}

/// Where attribute references inside a query resolve.
#[derive(Clone, Copy)]
struct Scope<'a> {
    root: &'a QueryMap,
    current: &'a QueryMap,
    direction: Direction,
}

impl<'a> Scope<'a> {
    fn enter(self, join: &'a QueryMap) -> Self {
        Self {
            current: join,
            ..self
        }
    }

    /// Resolve an optional link-entity qualifier to its map and the
    /// qualifier to emit.
    ///
    /// Qualifiers are query-local aliases and are kept. A join without an
    /// explicit alias is addressed by its type name, which is renamed.
    fn qualified(
        &self,
        qualifier: Option<String>,
    ) -> Result<(&'a EntityMap, Option<String>), Error> {
        let Some(alias) = qualifier else {
            return Ok((self.current.primary(), None));
        };
        let join = self
            .root
            .find(&alias)
            .ok_or_else(|| Error::UnknownJoin {
                alias: alias.clone(),
            })?
            .primary();
        let alias = if join.alias().is_none() && join.names().source(self.direction) == alias {
            join.type_name(self.direction).to_string()
        } else {
            alias
        };
        Ok((join, Some(alias)))
    }

    fn filter(&self, filter: FilterExpression) -> Result<FilterExpression, Error> {
        let FilterExpression {
            filter_operator,
            conditions,
            filters,
        } = filter;

        Ok(FilterExpression {
            filter_operator,
            conditions: conditions
                .into_iter()
                .map(|condition| self.condition(condition))
                .collect::<Result<_, _>>()?,
            filters: filters
                .into_iter()
                .map(|filter| self.filter(filter))
                .collect::<Result<_, _>>()?,
        })
    }

    fn condition(&self, condition: ConditionExpression) -> Result<ConditionExpression, Error> {
        let ConditionExpression {
            entity_name,
            attribute_name,
            operator,
            values,
        } = condition;

        let (entity_map, entity_name) = self.qualified(entity_name)?;
        Ok(ConditionExpression {
            entity_name,
            attribute_name: entity_map
                .map_attribute(&attribute_name, self.direction)?
                .to_string(),
            operator,
            values,
        })
    }

    fn orders(&self, orders: Vec<OrderExpression>) -> Result<Vec<OrderExpression>, Error> {
        orders
            .into_iter()
            .map(|order| {
                let (entity_map, entity_name) = self.qualified(order.entity_name)?;
                Ok(OrderExpression {
                    entity_name,
                    attribute_name: entity_map
                        .map_attribute(&order.attribute_name, self.direction)?
                        .to_string(),
                    order_type: order.order_type,
                })
            })
            .collect()
    }

    fn links(&self, links: Vec<LinkEntity>) -> Result<Vec<LinkEntity>, Error> {
        links.into_iter().map(|link| self.link(link)).collect()
    }

    fn link(&self, link: LinkEntity) -> Result<LinkEntity, Error> {
        let join = self.current.join(link.key())?;
        let inner = self.enter(join);
        let (from, to) = (self.current.primary(), join.primary());

        let LinkEntity {
            link_from_entity_name: _,
            link_to_entity_name: _,
            link_from_attribute_name,
            link_to_attribute_name,
            join_operator,
            entity_alias,
            columns,
            link_criteria,
            link_entities,
            orders,
        } = link;

        Ok(LinkEntity {
            link_from_entity_name: from.type_name(self.direction).to_string(),
            link_to_entity_name: to.type_name(self.direction).to_string(),
            link_from_attribute_name: from
                .map_attribute(&link_from_attribute_name, self.direction)?
                .to_string(),
            link_to_attribute_name: to
                .map_attribute(&link_to_attribute_name, self.direction)?
                .to_string(),
            join_operator,
            entity_alias,
            columns: rewrite_columns(columns, to, self.direction)?,
            link_criteria: inner.filter(link_criteria)?,
            link_entities: inner.links(link_entities)?,
            orders: inner.orders(orders)?,
        })
    }
}
