//! Conditional document operation engine
//!
//! Call chains collect per-call options (revision conditions, conflict
//! policy, sync mode) into an immutable `OperationConfig`, a terminal verb
//! turns them into one request, and the response interpreter classifies the
//! answer into an `Outcome`.
//!
//! # Supported Operations
//!
//! - get
//! - check
//! - create
//! - replace
//! - update
//! - delete

mod config;
mod dispatcher;
mod errors;
mod interpreter;
mod outcome;
mod request;
mod verb;

pub use config::{ConflictPolicy, OperationConfig};
pub use dispatcher::{Database, DocumentOperation};
pub use errors::{OperationError, OperationResult};
pub use interpreter::ResponseInterpreter;
pub use outcome::{Outcome, OutcomeKind};
pub use request::{document_path, DOCUMENT_API};
pub use verb::Verb;
