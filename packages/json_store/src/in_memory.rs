//! In-memory loopback backing store.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use schemashim_adapter::{BackingStore, ConcurrencyBehavior, Request, Response};
use schemashim_records::{
    Attributes, ColumnSet, QueryExpression, Record, RecordCollection, RecordId, RecordReference,
    Value,
};
use tracing::{debug, trace};

use crate::{criteria, Error};

type Table = BTreeMap<String, Record>;

#[derive(Default)]
struct Tables {
    rows: BTreeMap<String, Table>,
    version: u64,
}

impl Tables {
    fn next_version(&mut self) -> String {
        self.version += 1;
        self.version.to_string()
    }
}

/// A backing store that keeps records in memory, in its own (native)
/// vocabulary.
///
/// Records are keyed by type name, then id. A type can declare a primary-id
/// attribute with [`InMemoryStore::with_primary_id`]; the store then keeps
/// that attribute equal to the record id.
///
/// # Example
///
/// ```rust
/// use schemashim_adapter::{BackingStore, Request, Response};
/// use schemashim_json_store::InMemoryStore;
/// use schemashim_records::{ColumnSet, Record, RecordReference};
///
/// let store = InMemoryStore::new().with_primary_id("account", "accountid");
/// store.insert(Record::new("account").with_id("1").with_attribute("name", "Acme"))?;
///
/// let response = store.execute(Request::Retrieve {
///     target: RecordReference::new("account", "1"),
///     columns: ColumnSet::new(["name"]),
///     related_queries: vec![],
/// })?;
///
/// match response {
///     Response::Retrieve(record) => assert_eq!(record.get("name").and_then(|v| v.as_str()), Some("Acme")),
///     other => panic!("unexpected {:?}", other),
/// }
/// # Ok::<(), schemashim_mapping::Error>(())
/// ```
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    primary_ids: BTreeMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the primary-id attribute of a record type.
    pub fn with_primary_id(
        mut self,
        type_name: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        self.primary_ids.insert(type_name.into(), attribute.into());
        self
    }

    /// Store a new record, as a Create would.
    pub fn insert(&self, record: Record) -> Result<RecordId, Error> {
        let mut tables = self.lock()?;
        self.create(&mut tables, record)
    }

    /// A snapshot of every stored record of one type, in id order.
    pub fn records(&self, type_name: &str) -> Result<Vec<Record>, Error> {
        let tables = self.lock()?;
        Ok(tables
            .rows
            .get(type_name)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, Error> {
        self.tables.lock().map_err(|_| Error::Poisoned)
    }

    fn primary_id(&self, type_name: &str) -> Option<&str> {
        self.primary_ids.get(type_name).map(String::as_str)
    }

    /// The id a record is stored under: its id, or its primary-id attribute.
    fn record_id(&self, record: &Record) -> Option<RecordId> {
        record.id.clone().or_else(|| {
            self.primary_id(&record.type_name)
                .and_then(|attribute| record.get(attribute))
                .and_then(|value| match value {
                    Value::String(s) => Some(RecordId::new(s.as_str())),
                    Value::Guid(g) => Some(RecordId::from(*g)),
                    Value::Integer(i) => Some(RecordId::new(i.to_string())),
                    _ => None,
                })
        })
    }

    fn create(&self, tables: &mut Tables, mut record: Record) -> Result<RecordId, Error> {
        let id = self.record_id(&record).unwrap_or_else(RecordId::generate);
        if let Some(attribute) = self.primary_id(&record.type_name) {
            record
                .attributes
                .insert(attribute.to_string(), Value::from(id.as_str()));
        }
        record.id = Some(id.clone());
        record.row_version = Some(tables.next_version());

        let table = tables.rows.entry(record.type_name.clone()).or_default();
        if table.contains_key(id.as_str()) {
            return Err(Error::AlreadyExists {
                type_name: record.type_name,
                id: id.to_string(),
            });
        }
        trace!(type_name = %record.type_name, id = %id, "create");
        table.insert(id.to_string(), record);
        Ok(id)
    }

    /// Find the stored key of the record a reference points at.
    fn find(&self, tables: &Tables, reference: &RecordReference) -> Result<String, Error> {
        let not_found = || Error::NotFound {
            type_name: reference.type_name.clone(),
            id: reference
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| format!("{:?}", reference.key_attributes)),
        };
        let table = tables.rows.get(&reference.type_name).ok_or_else(not_found)?;

        if let Some(id) = &reference.id {
            return if table.contains_key(id.as_str()) {
                Ok(id.to_string())
            } else {
                Err(not_found())
            };
        }
        let keys = reference.key_attributes.as_ref().ok_or_else(not_found)?;
        table
            .iter()
            .find(|(_, record)| {
                keys.iter().all(|(name, value)| {
                    record
                        .get(name)
                        .is_some_and(|v| criteria::compare(v, value) == Some(Ordering::Equal))
                })
            })
            .map(|(key, _)| key.clone())
            .ok_or_else(not_found)
    }

    fn check_version(
        stored: &Record,
        expected: Option<&str>,
        concurrency: ConcurrencyBehavior,
    ) -> Result<(), Error> {
        if concurrency == ConcurrencyBehavior::IfRowVersionMatches
            && stored.row_version.as_deref() != expected
        {
            return Err(Error::RowVersionMismatch {
                type_name: stored.type_name.clone(),
                id: stored.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            });
        }
        Ok(())
    }

    fn retrieve(
        &self,
        tables: &Tables,
        target: &RecordReference,
        columns: &ColumnSet,
    ) -> Result<Record, Error> {
        let key = self.find(tables, target)?;
        let record = tables
            .rows
            .get(&target.type_name)
            .and_then(|table| table.get(&key))
            .ok_or_else(|| Error::NotFound {
                type_name: target.type_name.clone(),
                id: key.clone(),
            })?;
        Ok(project(record.clone(), columns))
    }

    fn retrieve_multiple(
        &self,
        tables: &Tables,
        query: &QueryExpression,
    ) -> Result<RecordCollection, schemashim_mapping::Error> {
        if !query.link_entities.is_empty() {
            return Err(schemashim_mapping::Error::unsupported(
                "link entities in the in-memory store",
            ));
        }

        let mut rows = Vec::new();
        if let Some(table) = tables.rows.get(&query.entity_name) {
            for record in table.values() {
                if criteria::matches(record, &query.criteria)? {
                    rows.push(record.clone());
                }
            }
        }
        rows.sort_by(|a, b| criteria::order(a, b, &query.orders));

        let mut rows: Vec<Record> = rows
            .into_iter()
            .map(|record| project(record, &query.columns))
            .collect();
        if query.distinct {
            let mut seen = BTreeSet::new();
            rows.retain(|record| seen.insert(format!("{:?}", record.attributes)));
        }
        if let Some(top) = query.top_count {
            rows.truncate(top as usize);
        }

        let total = rows.len();
        let mut collection = RecordCollection::new(query.entity_name.as_str());
        match &query.page_info {
            Some(page) if page.count > 0 => {
                let size = page.count as usize;
                let skip = (page.page_number.max(1) as usize - 1) * size;
                collection.more_records = total > skip + size;
                collection.records = rows.into_iter().skip(skip).take(size).collect();
                if collection.more_records {
                    collection.paging_cookie = Some(format!("page={}", page.page_number.max(1)));
                }
            }
            _ => collection.records = rows,
        }
        if query
            .page_info
            .as_ref()
            .is_some_and(|page| page.return_total_record_count)
        {
            collection.total_record_count = total as i64;
        }
        Ok(collection)
    }

    fn update(
        &self,
        tables: &mut Tables,
        target: Record,
        concurrency: ConcurrencyBehavior,
    ) -> Result<(), Error> {
        let reference = RecordReference {
            type_name: target.type_name.clone(),
            id: self.record_id(&target),
            ..RecordReference::default()
        };
        let key = self.find(tables, &reference)?;
        let version = tables.next_version();
        let primary = self.primary_id(&target.type_name);

        let stored = tables
            .rows
            .get_mut(&target.type_name)
            .and_then(|table| table.get_mut(&key))
            .ok_or_else(|| Error::NotFound {
                type_name: target.type_name.clone(),
                id: key.clone(),
            })?;
        Self::check_version(stored, target.row_version.as_deref(), concurrency)?;

        let Record { attributes, .. } = target;
        merge(&mut stored.attributes, attributes, primary);
        stored.row_version = Some(version);
        trace!(type_name = %stored.type_name, id = %key, "update");
        Ok(())
    }

    fn delete(
        &self,
        tables: &mut Tables,
        target: &RecordReference,
        concurrency: ConcurrencyBehavior,
    ) -> Result<(), Error> {
        let key = self.find(tables, target)?;
        if let Some(table) = tables.rows.get_mut(&target.type_name) {
            if let Some(stored) = table.get(&key) {
                Self::check_version(stored, target.row_version.as_deref(), concurrency)?;
            }
            table.remove(&key);
        }
        trace!(type_name = %target.type_name, id = %key, "delete");
        Ok(())
    }
}

/// Merge updated attributes, keeping the primary-id attribute unchanged.
fn merge(stored: &mut Attributes, update: Attributes, primary: Option<&str>) {
    for (name, value) in update {
        if Some(name.as_str()) != primary {
            stored.insert(name, value);
        }
    }
}

fn project(mut record: Record, columns: &ColumnSet) -> Record {
    if !columns.is_all() {
        record.attributes.retain(|name, _| columns.contains(name));
    }
    record
}

impl BackingStore for InMemoryStore {
    fn execute(&self, request: Request) -> Result<Response, schemashim_mapping::Error> {
        debug!(kind = %request.kind(), type_name = request.type_name(), "in-memory store");
        let mut tables = self.lock()?;

        let response = match request {
            Request::Retrieve {
                target,
                columns,
                related_queries,
            } => {
                if !related_queries.is_empty() {
                    return Err(schemashim_mapping::Error::unsupported(
                        "RelatedEntitiesQuery",
                    ));
                }
                Response::Retrieve(self.retrieve(&tables, &target, &columns)?)
            }
            Request::RetrieveMultiple { query } => {
                Response::RetrieveMultiple(self.retrieve_multiple(&tables, &query)?)
            }
            Request::Create { target } => Response::Create(self.create(&mut tables, target)?),
            Request::Update {
                target,
                concurrency,
            } => {
                self.update(&mut tables, target, concurrency)?;
                Response::Update
            }
            Request::Delete {
                target,
                concurrency,
            } => {
                self.delete(&mut tables, &target, concurrency)?;
                Response::Delete
            }
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;
    use schemashim_records::{
        ConditionExpression, ConditionOperator, FilterExpression, OrderExpression, OrderType,
        PagingInfo,
    };

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new().with_primary_id("account", "accountid");
        for (id, name, revenue) in [("1", "Acme", 300i64), ("2", "Globex", 100), ("3", "Initech", 200)] {
            store
                .insert(
                    Record::new("account")
                        .with_id(id)
                        .with_attribute("name", name)
                        .with_attribute("revenue", revenue),
                )
                .unwrap();
        }
        store
    }

    fn retrieve_multiple(store: &InMemoryStore, query: QueryExpression) -> RecordCollection {
        match store.execute(Request::RetrieveMultiple { query }).unwrap() {
            Response::RetrieveMultiple(collection) => collection,
            other => panic!("expected a collection, got {:?}", other),
        }
    }

    fn names(collection: &RecordCollection) -> Vec<&str> {
        collection
            .records
            .iter()
            .filter_map(|r| r.get("name").and_then(Value::as_str))
            .collect()
    }

    #[test]
    fn insert_mirrors_primary_id() {
        let store = store();
        let records = store.records("account").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("accountid"), Some(&Value::from("1")));
        assert!(records[0].row_version.is_some());
    }

    #[test]
    fn create_generates_ids() {
        let store = store();
        let response = store
            .execute(Request::Create {
                target: Record::new("account").with_attribute("name", "Hooli"),
            })
            .unwrap();

        let Response::Create(id) = response else {
            panic!("expected an id");
        };
        assert_eq!(id.as_str().len(), 36);
        assert_eq!(store.records("account").unwrap().len(), 4);
    }

    #[test]
    fn duplicate_create_fails() {
        let store = store();
        let err = store
            .execute(Request::Create {
                target: Record::new("account").with_id("1"),
            })
            .unwrap_err();
        assert_eq!(err.kind(), schemashim_mapping::ErrorKind::Collaborator);
    }

    #[test]
    fn retrieve_projects_columns() {
        let store = store();
        let response = store
            .execute(Request::Retrieve {
                target: RecordReference::new("account", "2"),
                columns: ColumnSet::new(["name"]),
                related_queries: vec![],
            })
            .unwrap();

        let Response::Retrieve(record) = response else {
            panic!("expected a record");
        };
        assert_eq!(record.attributes, btree! { "name".to_string() => Value::from("Globex") });
        assert_eq!(record.id, Some(RecordId::from("2")));
    }

    #[test]
    fn retrieve_by_alternate_key() {
        let store = store();
        let target = RecordReference::by_key("account", btree! { "name".to_string() => Value::from("Initech") });
        let response = store
            .execute(Request::Retrieve {
                target,
                columns: ColumnSet::All,
                related_queries: vec![],
            })
            .unwrap();

        let Response::Retrieve(record) = response else {
            panic!("expected a record");
        };
        assert_eq!(record.id, Some(RecordId::from("3")));
    }

    #[test]
    fn missing_record_is_a_store_error() {
        let err = store()
            .execute(Request::Retrieve {
                target: RecordReference::new("account", "9"),
                columns: ColumnSet::All,
                related_queries: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, schemashim_mapping::Error::Store(_)));
    }

    #[test]
    fn filter_order_and_page() {
        let store = store();
        let query = QueryExpression::new("account")
            .with_columns(ColumnSet::new(["name"]))
            .with_criteria(FilterExpression::default().with_condition(ConditionExpression::new(
                "revenue",
                ConditionOperator::GreaterEqual,
                vec![Value::from(150i64)],
            )))
            .with_order(OrderExpression::new("revenue", OrderType::Ascending));

        assert_eq!(names(&retrieve_multiple(&store, query.clone())), vec!["Initech", "Acme"]);

        let mut paged = QueryExpression::new("account")
            .with_columns(ColumnSet::all())
            .with_order(OrderExpression::new("name", OrderType::Descending));
        paged.page_info = Some(PagingInfo {
            return_total_record_count: true,
            ..PagingInfo::page(2, 1)
        });

        let first = retrieve_multiple(&store, paged.clone());
        assert_eq!(names(&first), vec!["Initech", "Globex"]);
        assert!(first.more_records);
        assert!(first.paging_cookie.is_some());
        assert_eq!(first.total_record_count, 3);

        paged.page_info = Some(PagingInfo::page(2, 2));
        let second = retrieve_multiple(&store, paged);
        assert_eq!(names(&second), vec!["Acme"]);
        assert!(!second.more_records);
        assert_eq!(second.total_record_count, -1);
    }

    #[test]
    fn distinct_and_top() {
        let store = store();
        store
            .insert(Record::new("account").with_id("4").with_attribute("name", "Acme"))
            .unwrap();

        let mut query = QueryExpression::new("account").with_columns(ColumnSet::new(["name"]));
        query.distinct = true;
        assert_eq!(retrieve_multiple(&store, query.clone()).len(), 3);

        query.top_count = Some(1);
        assert_eq!(retrieve_multiple(&store, query).len(), 1);
    }

    #[test]
    fn link_entities_are_unsupported() {
        let query = QueryExpression::new("account").with_link(schemashim_records::LinkEntity::new(
            "account",
            "contact",
            "accountid",
            "parentcustomerid",
            schemashim_records::JoinOperator::Inner,
        ));
        let err = store()
            .execute(Request::RetrieveMultiple { query })
            .unwrap_err();
        assert_eq!(err.kind(), schemashim_mapping::ErrorKind::Unsupported);
    }

    #[test]
    fn update_merges_and_checks_versions() {
        let store = store();
        let version = store.records("account").unwrap()[0].row_version.clone();

        let mut stale = Record::new("account").with_id("1").with_attribute("name", "Acme Inc");
        stale.row_version = Some("0".to_string());
        let err = store
            .execute(Request::Update {
                target: stale,
                concurrency: ConcurrencyBehavior::IfRowVersionMatches,
            })
            .unwrap_err();
        assert!(matches!(err, schemashim_mapping::Error::Store(_)));

        let mut fresh = Record::new("account")
            .with_id("1")
            .with_attribute("name", "Acme Inc")
            .with_attribute("accountid", "999");
        fresh.row_version = version.clone();
        store
            .execute(Request::Update {
                target: fresh,
                concurrency: ConcurrencyBehavior::IfRowVersionMatches,
            })
            .unwrap();

        let updated = &store.records("account").unwrap()[0];
        assert_eq!(updated.get("name"), Some(&Value::from("Acme Inc")));
        assert_eq!(updated.get("revenue"), Some(&Value::from(300i64)));
        assert_eq!(updated.get("accountid"), Some(&Value::from("1")));
        assert_ne!(updated.row_version, version);
    }

    #[test]
    fn delete_removes() {
        let store = store();
        store
            .execute(Request::Delete {
                target: RecordReference::new("account", "2"),
                concurrency: ConcurrencyBehavior::Default,
            })
            .unwrap();
        assert_eq!(store.records("account").unwrap().len(), 2);

        let err = store
            .execute(Request::Delete {
                target: RecordReference::new("account", "2"),
                concurrency: ConcurrencyBehavior::Default,
            })
            .unwrap_err();
        assert_eq!(err.kind(), schemashim_mapping::ErrorKind::Collaborator);
    }
}
