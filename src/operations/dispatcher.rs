//! Document operation dispatcher
//!
//! `Database` owns a transport and nothing else. Each call chain starts
//! with [`Database::document`], which hands out a fresh
//! [`DocumentOperation`] carrying its own `OperationConfig`. Setters return
//! new chain values and the terminal verb consumes the chain, so no option
//! can outlive its call or leak into another thread's call.
//!
//! ```ignore
//! let db = Database::new(MemoryStore::with_collections(&["docs"]));
//! let created = db.document().wait_for_sync(true).create("docs", &doc)?;
//! let current = db.document().if_none_match(rev).get(created.value().handle()?)?;
//! ```

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use super::config::{ConflictPolicy, OperationConfig};
use super::errors::OperationResult;
use super::interpreter::ResponseInterpreter;
use super::outcome::Outcome;
use super::request;
use super::verb::Verb;
use crate::config::ClientConfig;
use crate::document::{CollectionName, Document, DocumentError, IntoHandle, RevisionTag};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport};

/// Entry point for document operations against one database
pub struct Database<T: Transport> {
    transport: T,
}

impl<T: Transport> Database<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Starts a call chain with an empty configuration
    pub fn document(&self) -> DocumentOperation<'_, T> {
        DocumentOperation {
            database: self,
            config: OperationConfig::new(),
        }
    }
}

impl Database<HttpTransport> {
    /// Database reached over HTTP
    pub fn connect(config: &ClientConfig) -> OperationResult<Self> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T: Transport> fmt::Debug for Database<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

/// One call chain: accumulated options plus the database they apply to
#[must_use = "a document operation does nothing until a verb is called"]
pub struct DocumentOperation<'a, T: Transport> {
    database: &'a Database<T>,
    config: OperationConfig,
}

impl<T: Transport> Clone for DocumentOperation<'_, T> {
    fn clone(&self) -> Self {
        Self {
            database: self.database,
            config: self.config.clone(),
        }
    }
}

impl<T: Transport> fmt::Debug for DocumentOperation<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentOperation")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> DocumentOperation<'_, T> {
    /// Replaces the whole configuration
    pub fn with_config(self, config: OperationConfig) -> Self {
        Self {
            database: self.database,
            config,
        }
    }

    /// Current configuration snapshot
    pub fn config(&self) -> &OperationConfig {
        &self.config
    }

    pub fn if_match(self, tag: impl Into<RevisionTag>) -> Self {
        let Self { database, config } = self;
        Self {
            database,
            config: config.if_match(tag),
        }
    }

    pub fn if_match_with(self, tag: impl Into<RevisionTag>, policy: ConflictPolicy) -> Self {
        let Self { database, config } = self;
        Self {
            database,
            config: config.if_match_with(tag, policy),
        }
    }

    pub fn if_none_match(self, tag: impl Into<RevisionTag>) -> Self {
        let Self { database, config } = self;
        Self {
            database,
            config: config.if_none_match(tag),
        }
    }

    pub fn wait_for_sync(self, wait: bool) -> Self {
        let Self { database, config } = self;
        Self {
            database,
            config: config.wait_for_sync(wait),
        }
    }

    pub fn keep_null(self, keep: bool) -> Self {
        let Self { database, config } = self;
        Self {
            database,
            config: config.keep_null(keep),
        }
    }

    pub fn merge_objects(self, merge: bool) -> Self {
        let Self { database, config } = self;
        Self {
            database,
            config: config.merge_objects(merge),
        }
    }

    // ==================
    // Verbs
    // ==================

    /// Reads a document
    pub fn get(self, handle: impl IntoHandle) -> OperationResult<Outcome<Document>> {
        let handle = handle.into_handle()?;
        let response = self.dispatch(Verb::Get, request::for_handle(Verb::Get, &handle), None)?;
        Self::finish(Verb::Get, ResponseInterpreter::interpret(Verb::Get, response))
    }

    /// Probes a document's current revision without reading its body
    pub fn check(self, handle: impl IntoHandle) -> OperationResult<Outcome<Option<RevisionTag>>> {
        let handle = handle.into_handle()?;
        let response =
            self.dispatch(Verb::Check, request::for_handle(Verb::Check, &handle), None)?;
        Self::finish(Verb::Check, ResponseInterpreter::interpret_check(response))
    }

    /// Inserts a new document; the store assigns `_id`, `_key` and `_rev`
    pub fn create(self, collection: &str, document: &Document) -> OperationResult<Outcome<Document>> {
        let collection = CollectionName::new(collection)?;
        if let Some(field) = document.reserved_fields().first() {
            return Err(DocumentError::ReservedField(field.to_string()).into());
        }

        let body = document.clone().into_value();
        let response = self.dispatch(Verb::Create, request::for_collection(&collection), Some(body))?;
        Self::finish(Verb::Create, ResponseInterpreter::interpret(Verb::Create, response))
    }

    /// Replaces a document's contents; `_key` is kept, `_rev` renewed
    pub fn replace(
        self,
        handle: impl IntoHandle,
        document: &Document,
    ) -> OperationResult<Outcome<Document>> {
        self.write(Verb::Replace, handle, document)
    }

    /// Merges fields into a document
    pub fn update(
        self,
        handle: impl IntoHandle,
        document: &Document,
    ) -> OperationResult<Outcome<Document>> {
        self.write(Verb::Update, handle, document)
    }

    /// Removes a document
    pub fn delete(self, handle: impl IntoHandle) -> OperationResult<Outcome<Document>> {
        let handle = handle.into_handle()?;
        let response =
            self.dispatch(Verb::Delete, request::for_handle(Verb::Delete, &handle), None)?;
        Self::finish(Verb::Delete, ResponseInterpreter::interpret(Verb::Delete, response))
    }

    fn write(
        self,
        verb: Verb,
        handle: impl IntoHandle,
        document: &Document,
    ) -> OperationResult<Outcome<Document>> {
        let handle = handle.into_handle()?;
        let body = document.without_reserved().into_value();
        let response = self.dispatch(verb, request::for_handle(verb, &handle), Some(body))?;
        Self::finish(verb, ResponseInterpreter::interpret(verb, response))
    }

    /// Validates the snapshot, sends exactly one request and drops the chain
    fn dispatch(
        self,
        verb: Verb,
        base: HttpRequest,
        body: Option<Value>,
    ) -> OperationResult<HttpResponse> {
        let Self { database, config } = self;
        config.validate_for(verb)?;

        let request = request::build(verb, base, &config, body);
        let path = request.path.clone();

        let response = database.transport.send(request).map_err(|e| {
            warn!(verb = %verb, path = %path, error = %e, "transport fault");
            e
        })?;

        debug!(verb = %verb, path = %path, status = response.status, "document operation dispatched");

        Ok(response)
    }

    fn finish<V>(verb: Verb, result: OperationResult<Outcome<V>>) -> OperationResult<Outcome<V>> {
        match result {
            Ok(ref outcome) if !outcome.is_success() => {
                debug!(verb = %verb, status = outcome.status_code(), kind = ?outcome.kind(), "conditional outcome");
            }
            Err(ref e) => {
                warn!(verb = %verb, code = e.code(), error = %e, "document operation failed");
            }
            _ => {}
        }
        result
    }
}
