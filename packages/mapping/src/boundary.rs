//! A closed set of the values that cross the adapter boundary.

use schemashim_records::{Attributes, QueryExpression, Record, RecordCollection, RecordReference};

use crate::convert::{
    rewrite_attributes, rewrite_collection, rewrite_query, rewrite_record, rewrite_reference,
};
use crate::{Direction, Error, QueryMap};

/// Any boundary value that carries schema-dependent names.
///
/// # Example
///
/// ```rust
/// use schemashim_mapping::{
///     AttributeMap, Boundary, Direction, EntityMap, NameMap, QueryMap,
/// };
/// use schemashim_records::{Record, RecordReference};
///
/// let map = QueryMap::new(EntityMap::new(
///     NameMap::new("account", "Customer")?,
///     vec![
///         AttributeMap::new(NameMap::new("accountid", "CustomerId")?, true),
///         AttributeMap::new(NameMap::new("name", "CustomerName")?, false),
///     ],
///     None,
/// )?);
///
/// let values: Vec<Boundary> = vec![
///     RecordReference::new("Customer", "1").into(),
///     Record::new("Customer").with_attribute("CustomerName", "Acme").into(),
/// ];
/// for value in values {
///     let native = value.rewrite(&map, Direction::ToNative)?;
///     assert_eq!(native.type_name(), Some("account"));
/// }
/// # Ok::<(), schemashim_mapping::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    Reference(RecordReference),
    Record(Record),
    Collection(RecordCollection),
    Attributes(Attributes),
    Query(QueryExpression),
}

impl Boundary {
    /// Rewrite this value in `direction`.
    ///
    /// Queries and collections use the whole query map; every other shape
    /// uses its primary entity map.
    pub fn rewrite(self, query_map: &QueryMap, direction: Direction) -> Result<Self, Error> {
        let primary = query_map.primary();
        Ok(match self {
            Boundary::Reference(reference) => {
                Boundary::Reference(rewrite_reference(reference, primary, direction)?)
            }
            Boundary::Record(record) => Boundary::Record(rewrite_record(record, primary, direction)?),
            Boundary::Collection(collection) => {
                Boundary::Collection(rewrite_collection(collection, query_map, direction)?)
            }
            Boundary::Attributes(attributes) => {
                Boundary::Attributes(rewrite_attributes(attributes, primary, direction))
            }
            Boundary::Query(query) => Boundary::Query(rewrite_query(query, query_map, direction)?),
        })
    }

    /// The record type name this value refers to, if it names one.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Boundary::Reference(reference) => Some(&reference.type_name),
            Boundary::Record(record) => Some(&record.type_name),
            Boundary::Collection(collection) => Some(&collection.type_name),
            Boundary::Query(query) => Some(&query.entity_name),
            Boundary::Attributes(_) => None,
        }
    }
}

impl From<RecordReference> for Boundary {
    fn from(reference: RecordReference) -> Self {
        Boundary::Reference(reference)
    }
}

impl From<Record> for Boundary {
    fn from(record: Record) -> Self {
        Boundary::Record(record)
    }
}

impl From<RecordCollection> for Boundary {
    fn from(collection: RecordCollection) -> Self {
        Boundary::Collection(collection)
    }
}

impl From<Attributes> for Boundary {
    fn from(attributes: Attributes) -> Self {
        Boundary::Attributes(attributes)
    }
}

impl From<QueryExpression> for Boundary {
    fn from(query: QueryExpression) -> Self {
        Boundary::Query(query)
    }
}
