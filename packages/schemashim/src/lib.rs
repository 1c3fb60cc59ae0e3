//! # schemashim
//!
//! Lets a fixed request pipeline operate against a backing store whose
//! schema uses different record-type and attribute names. Requests are
//! rewritten into the backing store's vocabulary, executed, and the
//! responses rewritten back.
//!
//! ## Crates
//!
//! - [`records`]: boundary values (records, references, collections, queries)
//! - [`mapping`]: name maps, map factories and the rewriting engine
//! - [`adapter`]: messages, requests, responses and the `Adapter`
//! - [`json_store`]: JSON-configured name mapping and metadata, and an
//!   in-memory loopback store
//!
//! ## Example
//!
//! ```rust
//! use schemashim::adapter::{Adapter, AdapterConfig, Request, Response};
//! use schemashim::json_store::{InMemoryStore, JsonMetadata, MappingConfig};
//! use schemashim::records::{ColumnSet, Record, RecordReference};
//!
//! let mapping = MappingConfig::from_json_str(r#"{
//!     "entities": {"account": {
//!         "external_name": "Customer",
//!         "attributes": {"accountid": "CustomerId", "name": "CustomerName"}
//!     }}
//! }"#)?;
//! let metadata = JsonMetadata::from_json_str(r#"{
//!     "record_types": [{"native_type_name": "account", "attributes": [
//!         {"native_name": "accountid", "is_primary_id": true},
//!         {"native_name": "name"}
//!     ]}]
//! }"#)?
//! .with_mapper_names(&mapping)?;
//!
//! let store = InMemoryStore::new().with_primary_id("account", "accountid");
//! store.insert(Record::new("account").with_id("123").with_attribute("name", "Acme"))?;
//!
//! let adapter = Adapter::new(metadata, mapping, AdapterConfig::default());
//! let response = adapter.execute(
//!     Request::Retrieve {
//!         target: RecordReference::new("Customer", "123"),
//!         columns: ColumnSet::new(["CustomerName"]),
//!         related_queries: vec![],
//!     },
//!     &store,
//! )?;
//!
//! let Response::Retrieve(record) = response else { unreachable!() };
//! assert_eq!(record.type_name, "Customer");
//! assert_eq!(record.get("CustomerName").and_then(|v| v.as_str()), Some("Acme"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use schemashim_adapter as adapter;
pub use schemashim_json_store as json_store;
pub use schemashim_mapping as mapping;
pub use schemashim_records as records;

pub use schemashim_adapter::{Adapter, AdapterConfig, BackingStore, Request, Response};
pub use schemashim_mapping::{Direction, Error, ErrorKind, MetadataSource, NameMapper};
