//! # Operation Errors
//!
//! Everything a terminal verb can fail with. Precondition (412) and
//! not-modified (304) answers are not errors; they come back as
//! non-success outcomes.
//!
//! Error classes:
//! - validation (raised before any request is sent)
//! - transport fault (FATAL)
//! - server fault: status outside the protocol table, or a malformed
//!   success body (FATAL)

use thiserror::Error;

use super::verb::Verb;
use crate::document::DocumentError;
use crate::transport::TransportError;

/// Result type for document operations
pub type OperationResult<T> = Result<T, OperationError>;

/// Operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    // ==================
    // Validation
    // ==================
    /// Bad handle, collection or payload
    #[error("Validation failed: {0}")]
    Validation(#[from] DocumentError),

    /// Option combination the verb cannot express
    #[error("Invalid options for {verb}: {reason}")]
    InvalidOptions { verb: Verb, reason: String },

    // ==================
    // Faults
    // ==================
    /// Connection-level failure
    #[error("Transport fault: {0}")]
    Transport(#[from] TransportError),

    /// Status the protocol does not anticipate for this verb
    #[error("Server fault on {verb}: status {status}, {}", describe(.error_num, .message))]
    Server {
        verb: Verb,
        status: u16,
        error_num: Option<u32>,
        message: Option<String>,
    },

    /// Anticipated status with a body that lacks required fields
    #[error("Malformed response to {verb} (status {status}): {reason}")]
    MalformedResponse {
        verb: Verb,
        status: u16,
        reason: String,
    },
}

fn describe(error_num: &Option<u32>, message: &Option<String>) -> String {
    match (error_num, message) {
        (Some(num), Some(msg)) => format!("errorNum {}: {}", num, msg),
        (Some(num), None) => format!("errorNum {}", num),
        (None, Some(msg)) => msg.clone(),
        (None, None) => "no error details".to_string(),
    }
}

impl OperationError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            OperationError::Validation(e) => e.code(),
            OperationError::InvalidOptions { .. } => "REVDOC_INVALID_OPTIONS",
            OperationError::Transport(e) => e.code(),
            OperationError::Server { .. } => "REVDOC_SERVER_FAULT",
            OperationError::MalformedResponse { .. } => "REVDOC_MALFORMED_RESPONSE",
        }
    }

    /// Faults come from outside the caller's control; validation errors do not
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OperationError::Transport(_)
                | OperationError::Server { .. }
                | OperationError::MalformedResponse { .. }
        )
    }

    /// Status code when the store answered
    pub fn status(&self) -> Option<u16> {
        match self {
            OperationError::Server { status, .. }
            | OperationError::MalformedResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Store error number when the store supplied one
    pub fn error_num(&self) -> Option<u32> {
        match self {
            OperationError::Server { error_num, .. } => *error_num,
            _ => None,
        }
    }
}
