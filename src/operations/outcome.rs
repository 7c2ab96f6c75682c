//! Operation outcomes
//!
//! An `Outcome` is what a terminal verb returns whenever the store answered
//! with a status the protocol anticipates, including the non-success ones
//! (304, 412). `success` follows from the kind, never from a status range.

/// Classified store answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// 200 on get/check
    Found,
    /// 201: write applied and synced
    Created,
    /// 202: write applied, sync not awaited
    Accepted,
    /// 200/202 on delete
    Removed,
    /// 304: `if_none_match` equals the stored revision
    NotModified,
    /// 412: `if_match` differs from the stored revision
    PreconditionFailed,
    /// 404 on check
    NotFound,
}

impl OutcomeKind {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            OutcomeKind::Found | OutcomeKind::Created | OutcomeKind::Accepted | OutcomeKind::Removed
        )
    }
}

/// Typed result of a document operation
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    status_code: u16,
    success: bool,
    kind: OutcomeKind,
    value: T,
}

impl<T> Outcome<T> {
    pub fn new(kind: OutcomeKind, status_code: u16, value: T) -> Self {
        Self {
            status_code,
            success: kind.is_success(),
            kind,
            value,
        }
    }

    /// Status code the store answered with
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Transforms the value, keeping status and kind
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        Outcome {
            status_code: self.status_code,
            success: self.success,
            kind: self.kind,
            value: f(self.value),
        }
    }
}
