//! RevisionTag - opaque document revision marker
//!
//! The store assigns a fresh tag on every successful create, replace and
//! update. The client never generates one and only compares tags for
//! equality.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque revision tag as assigned by the store.
///
/// No ordering is defined: two tags are either the same revision or not.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionTag(String);

impl RevisionTag {
    /// Wraps a tag received from the store (or copied from a `_rev` field).
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the raw tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the tag as an entity tag for `If-Match` / `If-None-Match`.
    pub fn to_header_value(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Parses an entity tag header value, with or without surrounding quotes.
    ///
    /// Weak validators (`W/"..."`) are accepted and treated as the bare tag.
    pub fn from_header_value(value: &str) -> Option<Self> {
        let value = value.trim();
        let value = value.strip_prefix("W/").unwrap_or(value);
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);

        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }
}

impl fmt::Display for RevisionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RevisionTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for RevisionTag {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl From<&RevisionTag> for RevisionTag {
    fn from(tag: &RevisionTag) -> Self {
        tag.clone()
    }
}
