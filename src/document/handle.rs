//! Document handles and collection names
//!
//! A handle is the composite identifier `<collection>/<key>`. It is always
//! derived from its two parts and validated on construction, so a value of
//! this type is known to be well formed.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use super::errors::{DocumentError, DocumentResult};

static HANDLE_PATTERN: OnceLock<Regex> = OnceLock::new();
static COLLECTION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn handle_pattern() -> &'static Regex {
    HANDLE_PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_-]+)/([A-Za-z0-9_:-]+)$").expect("handle pattern is valid")
    })
}

fn collection_pattern() -> &'static Regex {
    COLLECTION_PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("collection pattern is valid"))
}

/// Validated collection name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionName(String);

impl CollectionName {
    /// Validate and wrap a collection name
    pub fn new(name: impl Into<String>) -> DocumentResult<Self> {
        let name = name.into();
        if collection_pattern().is_match(&name) {
            Ok(Self(name))
        } else {
            Err(DocumentError::InvalidCollection(name))
        }
    }

    /// Returns the name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CollectionName {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// `<collection>/<key>` document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentHandle {
    collection: String,
    key: String,
}

impl DocumentHandle {
    /// Parse a handle string such as `users/12345`
    pub fn parse(handle: &str) -> DocumentResult<Self> {
        let captures = handle_pattern()
            .captures(handle)
            .ok_or_else(|| DocumentError::InvalidHandle(handle.to_string()))?;

        Ok(Self {
            collection: captures[1].to_string(),
            key: captures[2].to_string(),
        })
    }

    /// Build a handle from a collection and a key
    pub fn from_parts(collection: &CollectionName, key: &str) -> DocumentResult<Self> {
        Self::parse(&format!("{}/{}", collection.as_str(), key))
    }

    /// Collection part
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Key part
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

impl FromStr for DocumentHandle {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Anything a verb accepts as a document target
///
/// Implemented for raw strings (validated on use) and for already parsed
/// handles.
pub trait IntoHandle {
    fn into_handle(self) -> DocumentResult<DocumentHandle>;
}

impl IntoHandle for DocumentHandle {
    fn into_handle(self) -> DocumentResult<DocumentHandle> {
        Ok(self)
    }
}

impl IntoHandle for &DocumentHandle {
    fn into_handle(self) -> DocumentResult<DocumentHandle> {
        Ok(self.clone())
    }
}

impl IntoHandle for &str {
    fn into_handle(self) -> DocumentResult<DocumentHandle> {
        DocumentHandle::parse(self)
    }
}

impl IntoHandle for String {
    fn into_handle(self) -> DocumentResult<DocumentHandle> {
        DocumentHandle::parse(&self)
    }
}

impl IntoHandle for &String {
    fn into_handle(self) -> DocumentResult<DocumentHandle> {
        DocumentHandle::parse(self)
    }
}
