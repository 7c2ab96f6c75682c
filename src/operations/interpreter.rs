//! Response interpretation
//!
//! Maps `(verb, status, body)` to an [`Outcome`] or an [`OperationError`].
//!
//! | verb                     | status  | kind               |
//! |--------------------------|---------|--------------------|
//! | get                      | 200     | Found              |
//! | get, check               | 304     | NotModified        |
//! | all but create           | 412     | PreconditionFailed |
//! | create, replace, update  | 201     | Created            |
//! | create, replace, update  | 202     | Accepted           |
//! | delete                   | 200/202 | Removed            |
//! | check                    | 200     | Found              |
//! | check                    | 404     | NotFound           |
//!
//! Any other pair is a server fault.

use serde_json::Value;

use super::errors::{OperationError, OperationResult};
use super::outcome::{Outcome, OutcomeKind};
use super::verb::Verb;
use crate::document::{type_name, Document, RevisionTag, RESERVED_FIELDS};
use crate::transport::HttpResponse;

/// Turns raw store responses into outcomes
pub struct ResponseInterpreter;

impl ResponseInterpreter {
    /// Classifies a status for a verb; `None` means unanticipated
    pub fn classify(verb: Verb, status: u16) -> Option<OutcomeKind> {
        use OutcomeKind::*;

        match (verb, status) {
            (Verb::Get | Verb::Check, 200) => Some(Found),
            (Verb::Get | Verb::Check, 304) => Some(NotModified),
            (Verb::Check, 404) => Some(NotFound),
            (Verb::Create, 412) => None,
            (_, 412) => Some(PreconditionFailed),
            (Verb::Create | Verb::Replace | Verb::Update, 201) => Some(Created),
            (Verb::Create | Verb::Replace | Verb::Update, 202) => Some(Accepted),
            (Verb::Delete, 200 | 202) => Some(Removed),
            _ => None,
        }
    }

    /// Interprets the answer to get, create, replace, update or delete
    pub fn interpret(verb: Verb, response: HttpResponse) -> OperationResult<Outcome<Document>> {
        let status = response.status;
        let kind = Self::classify(verb, status).ok_or_else(|| Self::server_fault(verb, &response))?;

        let value = match kind {
            OutcomeKind::Found => {
                let doc = Self::object_body(verb, status, response.body)?;
                Self::require_identity(verb, status, &doc)?;
                doc
            }
            OutcomeKind::Created | OutcomeKind::Accepted | OutcomeKind::Removed => {
                let doc = Self::object_body(verb, status, response.body)?;
                Self::require_identity(verb, status, &doc)?;
                doc.identity()
            }
            OutcomeKind::PreconditionFailed => match response.body {
                Value::Null => Document::new(),
                body => Self::object_body(verb, status, body)?.identity(),
            },
            OutcomeKind::NotModified | OutcomeKind::NotFound => Document::new(),
        };

        Ok(Outcome::new(kind, status, value))
    }

    /// Interprets the answer to check; the value is the revision from `ETag`
    pub fn interpret_check(response: HttpResponse) -> OperationResult<Outcome<Option<RevisionTag>>> {
        let status = response.status;
        let kind = Self::classify(Verb::Check, status)
            .ok_or_else(|| Self::server_fault(Verb::Check, &response))?;

        let revision = response
            .header_value("ETag")
            .and_then(RevisionTag::from_header_value);

        if kind == OutcomeKind::Found && revision.is_none() {
            return Err(OperationError::MalformedResponse {
                verb: Verb::Check,
                status,
                reason: "missing ETag header".to_string(),
            });
        }

        let value = match kind {
            OutcomeKind::NotFound | OutcomeKind::NotModified => None,
            _ => revision,
        };

        Ok(Outcome::new(kind, status, value))
    }

    fn object_body(verb: Verb, status: u16, body: Value) -> OperationResult<Document> {
        Document::try_from(body).map_err(|e| OperationError::MalformedResponse {
            verb,
            status,
            reason: e.to_string(),
        })
    }

    fn require_identity(verb: Verb, status: u16, doc: &Document) -> OperationResult<()> {
        for field in RESERVED_FIELDS {
            if !doc.is_string(field) {
                let found = doc.get(field).map(type_name).unwrap_or("missing");
                return Err(OperationError::MalformedResponse {
                    verb,
                    status,
                    reason: format!("'{}' should be a string, found {}", field, found),
                });
            }
        }
        Ok(())
    }

    fn server_fault(verb: Verb, response: &HttpResponse) -> OperationError {
        let error_num = response
            .body
            .get("errorNum")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok());
        let message = response
            .body
            .get("errorMessage")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| response.body.as_str().map(str::to_string));

        OperationError::Server {
            verb,
            status: response.status,
            error_num,
            message,
        }
    }
}
