//! # Transport Errors
//!
//! Connection-level failures, distinct from any status code the store
//! returns.

use thiserror::Error;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the store
    #[error("Failed to connect to {target}: {reason}")]
    Connection { target: String, reason: String },

    /// Request exceeded the configured timeout
    #[error("Request to {target} timed out")]
    Timeout { target: String },

    /// Request could not be assembled (bad URL, header value, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response arrived but could not be read or parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::Connection { .. } => "REVDOC_TRANSPORT_CONNECTION",
            TransportError::Timeout { .. } => "REVDOC_TRANSPORT_TIMEOUT",
            TransportError::InvalidRequest(_) => "REVDOC_TRANSPORT_INVALID_REQUEST",
            TransportError::InvalidResponse(_) => "REVDOC_TRANSPORT_INVALID_RESPONSE",
        }
    }
}
