//! Per-call operation configuration
//!
//! `OperationConfig` is an immutable value. Every setter consumes the value
//! and returns a new one, so a configuration belongs to exactly one call
//! chain and is consumed by exactly one terminal verb.

use std::fmt;

use super::errors::{OperationError, OperationResult};
use super::verb::Verb;
use crate::document::RevisionTag;

/// How a revision mismatch on a mutating verb is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConflictPolicy {
    /// Fail the operation with a precondition outcome
    #[default]
    Error,
    /// Apply the write anyway (last write wins)
    Last,
}

impl ConflictPolicy {
    /// Wire value of the `policy` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::Error => "error",
            ConflictPolicy::Last => "last",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conditional and durability options for one document operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationConfig {
    if_match: Option<RevisionTag>,
    if_match_policy: ConflictPolicy,
    if_none_match: Option<RevisionTag>,
    wait_for_sync: Option<bool>,
    keep_null: Option<bool>,
    merge_objects: Option<bool>,
}

impl OperationConfig {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the stored revision to equal `tag` (policy `Error`)
    #[must_use]
    pub fn if_match(self, tag: impl Into<RevisionTag>) -> Self {
        self.if_match_with(tag, ConflictPolicy::Error)
    }

    /// Require the stored revision to equal `tag`, resolving a mismatch on
    /// mutating verbs with `policy`
    #[must_use]
    pub fn if_match_with(self, tag: impl Into<RevisionTag>, policy: ConflictPolicy) -> Self {
        Self {
            if_match: Some(tag.into()),
            if_match_policy: policy,
            ..self
        }
    }

    /// Require the stored revision to differ from `tag`
    #[must_use]
    pub fn if_none_match(self, tag: impl Into<RevisionTag>) -> Self {
        Self {
            if_none_match: Some(tag.into()),
            ..self
        }
    }

    /// Ask the store to sync to disk before acknowledging
    #[must_use]
    pub fn wait_for_sync(self, wait: bool) -> Self {
        Self {
            wait_for_sync: Some(wait),
            ..self
        }
    }

    /// Update only: whether null fields in the patch are stored or remove
    /// the field
    #[must_use]
    pub fn keep_null(self, keep: bool) -> Self {
        Self {
            keep_null: Some(keep),
            ..self
        }
    }

    /// Update only: whether nested objects are merged or replaced
    #[must_use]
    pub fn merge_objects(self, merge: bool) -> Self {
        Self {
            merge_objects: Some(merge),
            ..self
        }
    }

    pub fn if_match_tag(&self) -> Option<&RevisionTag> {
        self.if_match.as_ref()
    }

    pub fn if_match_policy(&self) -> ConflictPolicy {
        self.if_match_policy
    }

    pub fn if_none_match_tag(&self) -> Option<&RevisionTag> {
        self.if_none_match.as_ref()
    }

    pub fn wait_for_sync_flag(&self) -> Option<bool> {
        self.wait_for_sync
    }

    pub fn keep_null_flag(&self) -> Option<bool> {
        self.keep_null
    }

    pub fn merge_objects_flag(&self) -> Option<bool> {
        self.merge_objects
    }

    /// True when no option has been set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks option combinations that no request can express.
    ///
    /// - `if_match` together with `if_none_match`
    /// - any revision condition on create, where nothing is stored yet
    pub fn validate_for(&self, verb: Verb) -> OperationResult<()> {
        if self.if_match.is_some() && self.if_none_match.is_some() {
            return Err(OperationError::InvalidOptions {
                verb,
                reason: "if_match and if_none_match cannot be combined".to_string(),
            });
        }

        if verb == Verb::Create && (self.if_match.is_some() || self.if_none_match.is_some()) {
            return Err(OperationError::InvalidOptions {
                verb,
                reason: "revision conditions do not apply to new documents".to_string(),
            });
        }

        Ok(())
    }
}
