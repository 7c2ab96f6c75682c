//! # Document Errors
//!
//! Error types for handles, revisions and typed field access.

use thiserror::Error;

/// Result type for document-level operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Document errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    // ==================
    // Identity Errors
    // ==================
    /// Handle does not match `<collection>/<key>`
    #[error("Invalid document handle: '{0}'")]
    InvalidHandle(String),

    /// Collection name contains illegal characters or is empty
    #[error("Invalid collection name: '{0}'")]
    InvalidCollection(String),

    /// Caller supplied a store-managed field
    #[error("Reserved field '{0}' is managed by the store")]
    ReservedField(String),

    // ==================
    // Field Access Errors
    // ==================
    /// Value is not a JSON object and cannot be a document
    #[error("Document must be an object, got {0}")]
    NotAnObject(&'static str),

    /// Field not present in the document
    #[error("Field not found: {0}")]
    MissingField(String),

    /// Field present but holds another type
    #[error("Field '{field}' is {actual}, expected {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl DocumentError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::InvalidHandle(_) => "REVDOC_INVALID_HANDLE",
            DocumentError::InvalidCollection(_) => "REVDOC_INVALID_COLLECTION",
            DocumentError::ReservedField(_) => "REVDOC_RESERVED_FIELD",
            DocumentError::NotAnObject(_) => "REVDOC_NOT_AN_OBJECT",
            DocumentError::MissingField(_) => "REVDOC_MISSING_FIELD",
            DocumentError::FieldType { .. } => "REVDOC_FIELD_TYPE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_message() {
        let err = DocumentError::FieldType {
            field: "bar".to_string(),
            expected: "integer",
            actual: "string",
        };
        assert_eq!(err.to_string(), "Field 'bar' is string, expected integer");
        assert_eq!(err.code(), "REVDOC_FIELD_TYPE");
    }

    #[test]
    fn test_invalid_handle_code() {
        let err = DocumentError::InvalidHandle("nope".to_string());
        assert_eq!(err.code(), "REVDOC_INVALID_HANDLE");
        assert!(err.to_string().contains("nope"));
    }
}
