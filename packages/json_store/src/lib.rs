//! JSON-configured collaborators for the schemashim adapter.
//!
//! - `MappingConfig`: a `NameMapper` read from a JSON name table
//! - `JsonMetadata`: a `MetadataSource` read from a JSON record-type catalog
//! - `InMemoryStore`: a loopback `BackingStore` keeping records in memory

mod criteria;
mod error;
pub mod in_memory;
mod load;
pub mod mapping_config;
pub mod metadata;

pub use error::Error;
pub use in_memory::InMemoryStore;
pub use mapping_config::{EntityNames, Fallback, MappingConfig};
pub use metadata::JsonMetadata;
