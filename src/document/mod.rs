//! Document model
//!
//! Handles, revision tags and the document body type shared by the
//! operation engine and the transports.

mod body;
mod errors;
mod handle;
mod revision;

pub use body::{type_name, Document, ID_FIELD, KEY_FIELD, RESERVED_FIELDS, REV_FIELD};
pub use errors::{DocumentError, DocumentResult};
pub use handle::{CollectionName, DocumentHandle, IntoHandle};
pub use revision::RevisionTag;
