//! Request construction
//!
//! Applies an `OperationConfig` snapshot to a verb's base request. The rules
//! are the same for every verb:
//!
//! - `If-Match` from `if_match`; mutations also carry `policy`, so a `Last`
//!   policy reaches the store as "override and apply" instead of the header
//!   being dropped
//! - `If-None-Match` from `if_none_match`
//! - `waitForSync` on writes
//! - `keepNull` / `mergeObjects` on update

use serde_json::Value;

use super::config::OperationConfig;
use super::verb::Verb;
use crate::document::{CollectionName, DocumentHandle};
use crate::transport::HttpRequest;

/// Document API root
pub const DOCUMENT_API: &str = "/_api/document";

/// Path addressing one document
pub fn document_path(handle: &DocumentHandle) -> String {
    format!("{}/{}/{}", DOCUMENT_API, handle.collection(), handle.key())
}

/// Base request of a verb targeting an existing document
pub fn for_handle(verb: Verb, handle: &DocumentHandle) -> HttpRequest {
    HttpRequest::new(verb.method(), document_path(handle))
}

/// Base request of a create into `collection`
pub fn for_collection(collection: &CollectionName) -> HttpRequest {
    HttpRequest::new(Verb::Create.method(), DOCUMENT_API).query("collection", collection.as_str())
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Applies the configuration and payload to a base request
pub fn build(
    verb: Verb,
    base: HttpRequest,
    config: &OperationConfig,
    body: Option<Value>,
) -> HttpRequest {
    let mut request = base;

    if let Some(tag) = config.if_match_tag() {
        request = request.header("If-Match", tag.to_header_value());
        if verb.is_mutation() {
            request = request.query("policy", config.if_match_policy().as_str());
        }
    }

    if let Some(tag) = config.if_none_match_tag() {
        request = request.header("If-None-Match", tag.to_header_value());
    }

    if verb.is_write() {
        if let Some(wait) = config.wait_for_sync_flag() {
            request = request.query("waitForSync", flag(wait));
        }
    }

    if verb == Verb::Update {
        if let Some(keep) = config.keep_null_flag() {
            request = request.query("keepNull", flag(keep));
        }
        if let Some(merge) = config.merge_objects_flag() {
            request = request.query("mergeObjects", flag(merge));
        }
    }

    if let Some(body) = body {
        request = request.body(body);
    }

    request
}
