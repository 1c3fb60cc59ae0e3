//! Schema name mapping and request/response rewriting.
//!
//! This crate is the core of schemashim. It describes how one schema's
//! names map onto another's, builds those mappings from platform metadata,
//! and rewrites boundary values between the two vocabularies:
//! - `NameMap`, `AttributeMap`, `EntityMap`: the name mapping of one record type
//! - `EntityMapFactory`: builds an `EntityMap` from metadata and a `NameMapper`
//! - `QueryMap`, `QueryMapFactory`: the same for a query and all of its joins
//! - `rewrite_*`: the rewriting engine, one function per boundary shape
//! - `Boundary`: the single dispatch entry point for embedders that handle
//!   boundary values without knowing their shape up front. The adapter
//!   knows the shape of every message and calls `rewrite_*` directly.
//!
//! Only names are rewritten. Attribute values pass through unchanged.
//!
//! # Example
//!
//! ```rust
//! use schemashim_mapping::{
//!     rewrite_columns, AttributeMetadata, Direction, ElementKind, EntityMapFactory,
//!     RecordTypeMetadata,
//! };
//! use schemashim_records::ColumnSet;
//!
//! fn names(kind: ElementKind<'_>, native: &str) -> Option<String> {
//!     match (kind, native) {
//!         (ElementKind::Entity, "account") => Some("Customer".to_string()),
//!         (ElementKind::Attribute { .. }, "accountid") => Some("CustomerId".to_string()),
//!         (ElementKind::Attribute { .. }, "name") => Some("CustomerName".to_string()),
//!         _ => None,
//!     }
//! }
//!
//! let metadata = RecordTypeMetadata::new(
//!     "account",
//!     vec![AttributeMetadata::primary_id("accountid"), AttributeMetadata::new("name")],
//! );
//! let map = EntityMapFactory::new(&names).create(&metadata, None)?;
//!
//! let native = rewrite_columns(ColumnSet::new(["CustomerName"]), &map, Direction::ToNative)?;
//! assert_eq!(native, ColumnSet::new(["name"]));
//! # Ok::<(), schemashim_mapping::Error>(())
//! ```

mod boundary;
pub mod convert;
mod entity_map;
mod error;
mod metadata;
mod names;
mod query_map;

pub use boundary::Boundary;
pub use convert::{
    rewrite_attributes, rewrite_collection, rewrite_columns, rewrite_query, rewrite_record,
    rewrite_reference,
};
pub use entity_map::{EntityMap, EntityMapFactory};
pub use error::{BoxError, Error, ErrorKind};
pub use metadata::{AttributeMetadata, MetadataSource, RecordTypeMetadata};
pub use names::{AttributeMap, Direction, ElementKind, IdentityMapper, NameMap, NameMapper};
pub use query_map::{QueryMap, QueryMapFactory};

// Re-export the boundary value crate for convenience
pub use schemashim_records as records;
