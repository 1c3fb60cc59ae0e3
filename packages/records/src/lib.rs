//! Records: the boundary value objects exchanged with the request pipeline
//! and the backing store.
//!
//! Everything in this crate is plain data:
//! - `Value`: an attribute value, passed through untouched by schema rewriting
//! - `RecordId`: a record identifier
//! - `Record`, `RecordReference`, `RecordCollection`: record-shaped payloads
//! - `QueryExpression`: a joinable, filterable, orderable query tree
//!
//! Values are constructed fresh per request and never shared between requests.
//!
//! # Example
//!
//! ```rust
//! use schemashim_records::{Record, RecordReference, Value};
//!
//! let reference = RecordReference::new("account", "123");
//! let record = Record::new("account")
//!     .with_id("123")
//!     .with_attribute("name", Value::from("Acme"));
//!
//! assert_eq!(reference.id, record.id);
//! ```

mod collection;
mod id;
pub mod query;
mod record;
mod reference;
mod value;

pub use collection::RecordCollection;
pub use id::RecordId;
pub use query::{
    ColumnSet, ConditionExpression, ConditionOperator, FilterExpression, JoinOperator, LinkEntity,
    LogicalOperator, OrderExpression, OrderType, PagingInfo, QueryExpression,
};
pub use record::{Attributes, LazyFileAttribute, Record, RecordState};
pub use reference::RecordReference;
pub use value::Value;
