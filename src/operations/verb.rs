//! Document verbs

use std::fmt;

use crate::transport::Method;

/// Terminal verbs of a document operation chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Check,
    Create,
    Replace,
    Update,
    Delete,
}

impl Verb {
    /// Request method this verb is sent with
    pub fn method(&self) -> Method {
        match self {
            Verb::Get => Method::Get,
            Verb::Check => Method::Head,
            Verb::Create => Method::Post,
            Verb::Replace => Method::Put,
            Verb::Update => Method::Patch,
            Verb::Delete => Method::Delete,
        }
    }

    /// Verbs that change an existing document and honor a conflict policy
    pub fn is_mutation(&self) -> bool {
        matches!(self, Verb::Replace | Verb::Update | Verb::Delete)
    }

    /// Verbs that write and therefore accept `waitForSync`
    pub fn is_write(&self) -> bool {
        self.is_mutation() || *self == Verb::Create
    }

    pub fn name(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Check => "check",
            Verb::Create => "create",
            Verb::Replace => "replace",
            Verb::Update => "update",
            Verb::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
