//! The schemashim adapter.
//!
//! This crate turns inbound pipeline messages into typed requests, rewrites
//! them into the backing store's vocabulary, runs them against an injected
//! [`BackingStore`], and rewrites the response back:
//! - `Message` / `Request` / `Response`: what crosses the pipeline boundary
//! - `AdapterConfig`: which message kinds are served
//! - `Adapter`: one configurable adapter for all of them
//!
//! # Usage
//!
//! ```rust,ignore
//! use schemashim_adapter::{Adapter, AdapterConfig, Message};
//!
//! let adapter = Adapter::new(metadata, mapper, AdapterConfig::default());
//! let response = adapter.handle(message, &store)?;
//! ```

mod adapter;
mod config;
pub mod message;
mod store;

pub use adapter::{Adapter, Pending, Prepared};
pub use config::AdapterConfig;
pub use message::{ConcurrencyBehavior, Message, MessageKind, Parameter, Request, Response};
pub use store::BackingStore;

// Re-export key types for convenience
pub use schemashim_mapping::{Error, ErrorKind};
