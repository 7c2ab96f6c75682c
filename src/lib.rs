//! revdoc - revision-aware document client
//!
//! Document CRUD against a remote document store with optimistic
//! concurrency control based on revision tags.
//!
//! # Layout
//!
//! - `document`: handles, revision tags and the document body type
//! - `operations`: per-call configuration, dispatch and response
//!   interpretation
//! - `transport`: the request seam, with HTTP and in-memory implementations
//! - `config`: client connection settings

pub mod config;
pub mod document;
pub mod operations;
pub mod transport;

pub use config::{ClientConfig, ConfigError, ConfigResult};
pub use document::{CollectionName, Document, DocumentError, DocumentHandle, RevisionTag};
pub use operations::{
    ConflictPolicy, Database, DocumentOperation, OperationConfig, OperationError,
    OperationResult, Outcome, OutcomeKind,
};
pub use transport::{HttpTransport, MemoryStore, Transport};
