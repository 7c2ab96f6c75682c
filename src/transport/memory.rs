//! In-process document store
//!
//! `MemoryStore` answers the same document requests a remote store does,
//! with the same revision and precondition rules, without a network. It
//! backs the integration tests and can stand in for a store in downstream
//! tests.
//!
//! Collections are registered up front; collection lifecycle is not part of
//! the request surface.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::errors::TransportResult;
use super::{HttpRequest, HttpResponse, Method, Transport};
use crate::document::{
    CollectionName, DocumentHandle, RevisionTag, ID_FIELD, KEY_FIELD, RESERVED_FIELDS, REV_FIELD,
};
use crate::operations::DOCUMENT_API;

// Store error numbers carried in failure bodies
const ERROR_BAD_PARAMETER: u32 = 400;
const ERROR_NOT_FOUND: u32 = 404;
const ERROR_METHOD_NOT_ALLOWED: u32 = 405;
const ERROR_CORRUPTED_JSON: u32 = 600;
const ERROR_CONFLICT: u32 = 1200;
const ERROR_DOCUMENT_NOT_FOUND: u32 = 1202;
const ERROR_COLLECTION_NOT_FOUND: u32 = 1203;
const ERROR_HANDLE_BAD: u32 = 1205;
const ERROR_UNIQUE_CONSTRAINT: u32 = 1210;

#[derive(Debug, Default)]
struct StoreState {
    collections: HashMap<String, BTreeMap<String, Map<String, Value>>>,
    next_key: u64,
    next_rev: u64,
}

impl StoreState {
    fn next_key(&mut self) -> String {
        self.next_key += 1;
        self.next_key.to_string()
    }

    fn next_rev(&mut self) -> String {
        self.next_rev += 1;
        format!("{}", 1_000_000 + self.next_rev)
    }
}

/// Parsed conditional/query options of one request
struct RequestOptions {
    if_match: Option<RevisionTag>,
    if_none_match: Option<RevisionTag>,
    wait_for_sync: bool,
    policy_last: bool,
    keep_null: bool,
    merge_objects: bool,
}

impl RequestOptions {
    fn parse(request: &HttpRequest) -> Result<Self, HttpResponse> {
        let policy_last = match request.query_value("policy") {
            None | Some("error") => false,
            Some("last") => true,
            Some(other) => {
                return Err(error_response(
                    400,
                    ERROR_BAD_PARAMETER,
                    &format!("invalid value for policy: '{}'", other),
                ))
            }
        };

        Ok(Self {
            if_match: request
                .header_value("If-Match")
                .and_then(RevisionTag::from_header_value),
            if_none_match: request
                .header_value("If-None-Match")
                .and_then(RevisionTag::from_header_value),
            wait_for_sync: bool_param(request, "waitForSync", false)?,
            policy_last,
            keep_null: bool_param(request, "keepNull", true)?,
            merge_objects: bool_param(request, "mergeObjects", true)?,
        })
    }
}

fn bool_param(request: &HttpRequest, name: &str, default: bool) -> Result<bool, HttpResponse> {
    match request.query_value(name) {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(error_response(
            400,
            ERROR_BAD_PARAMETER,
            &format!("invalid value for {}: '{}'", name, other),
        )),
    }
}

fn error_body(code: u16, error_num: u32, message: &str) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("error".to_string(), Value::Bool(true));
    body.insert("code".to_string(), json!(code));
    body.insert("errorNum".to_string(), json!(error_num));
    body.insert("errorMessage".to_string(), json!(message));
    body
}

fn error_response(code: u16, error_num: u32, message: &str) -> HttpResponse {
    HttpResponse::new(code, Value::Object(error_body(code, error_num, message)))
}

fn identity_of(doc: &Map<String, Value>) -> Map<String, Value> {
    RESERVED_FIELDS
        .iter()
        .filter_map(|f| doc.get(*f).map(|v| (f.to_string(), v.clone())))
        .collect()
}

fn rev_of(doc: &Map<String, Value>) -> &str {
    doc.get(REV_FIELD).and_then(Value::as_str).unwrap_or_default()
}

fn etag(rev: &str) -> String {
    RevisionTag::new(rev).to_header_value()
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

fn merge_patch(
    target: &mut Map<String, Value>,
    patch: Map<String, Value>,
    keep_null: bool,
    merge_objects: bool,
) {
    for (field, value) in patch {
        if value.is_null() && !keep_null {
            target.remove(&field);
            continue;
        }
        match (target.get_mut(&field), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) if merge_objects => {
                merge_patch(existing, nested, keep_null, merge_objects);
            }
            (_, value) => {
                let value = if keep_null { value } else { strip_nulls(value) };
                target.insert(field, value);
            }
        }
    }
}

/// In-memory document store speaking the document request protocol
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    /// Empty store with no collections
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given collections registered
    pub fn with_collections(names: &[&str]) -> Self {
        let store = Self::new();
        for name in names {
            store.add_collection(name);
        }
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a collection; returns false if the name is invalid
    pub fn add_collection(&self, name: &str) -> bool {
        if CollectionName::new(name).is_err() {
            return false;
        }
        self.lock().collections.entry(name.to_string()).or_default();
        true
    }

    /// Removes every document of a collection
    pub fn truncate(&self, collection: &str) {
        if let Some(docs) = self.lock().collections.get_mut(collection) {
            docs.clear();
        }
    }

    /// Number of documents in a collection (0 when unknown)
    pub fn count(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Snapshot of a stored document
    pub fn document(&self, handle: &DocumentHandle) -> Option<Value> {
        self.lock()
            .collections
            .get(handle.collection())
            .and_then(|docs| docs.get(handle.key()))
            .map(|doc| Value::Object(doc.clone()))
    }

    fn handle(&self, request: &HttpRequest) -> HttpResponse {
        let path = strip_database_prefix(&request.path);

        let options = match RequestOptions::parse(request) {
            Ok(options) => options,
            Err(response) => return response,
        };

        if path == DOCUMENT_API {
            return match request.method {
                Method::Post => self.create(request, &options),
                _ => error_response(405, ERROR_METHOD_NOT_ALLOWED, "method not supported"),
            };
        }

        let Some(raw_handle) = path
            .strip_prefix(DOCUMENT_API)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return error_response(404, ERROR_NOT_FOUND, "unknown path");
        };
        let Ok(handle) = DocumentHandle::parse(raw_handle) else {
            return error_response(400, ERROR_HANDLE_BAD, "illegal document handle");
        };

        match request.method {
            Method::Get => self.read(&handle, &options, true),
            Method::Head => self.read(&handle, &options, false),
            Method::Put => self.modify(&handle, request, &options, false),
            Method::Patch => self.modify(&handle, request, &options, true),
            Method::Delete => self.remove(&handle, &options),
            Method::Post => error_response(405, ERROR_METHOD_NOT_ALLOWED, "method not supported"),
        }
    }

    fn read(&self, handle: &DocumentHandle, options: &RequestOptions, with_body: bool) -> HttpResponse {
        let state = self.lock();
        let Some(doc) = lookup(&state, handle) else {
            return not_found(with_body);
        };
        let rev = rev_of(doc);

        if let Some(ref tag) = options.if_none_match {
            if tag.as_str() == rev {
                return HttpResponse::new(304, Value::Null).with_header("ETag", etag(rev));
            }
        }

        if let Some(ref tag) = options.if_match {
            if tag.as_str() != rev {
                let body = if with_body {
                    let mut body = error_body(412, ERROR_CONFLICT, "precondition failed");
                    body.extend(identity_of(doc));
                    Value::Object(body)
                } else {
                    Value::Null
                };
                return HttpResponse::new(412, body).with_header("ETag", etag(rev));
            }
        }

        let body = if with_body {
            Value::Object(doc.clone())
        } else {
            Value::Null
        };
        HttpResponse::new(200, body).with_header("ETag", etag(rev))
    }

    fn create(&self, request: &HttpRequest, options: &RequestOptions) -> HttpResponse {
        let Some(collection) = request.query_value("collection") else {
            return error_response(400, ERROR_BAD_PARAMETER, "'collection' parameter is missing");
        };
        let Some(Value::Object(body)) = request.body.clone() else {
            return error_response(400, ERROR_CORRUPTED_JSON, "expecting a JSON object body");
        };

        let mut state = self.lock();
        if !state.collections.contains_key(collection) {
            return error_response(404, ERROR_COLLECTION_NOT_FOUND, "collection not found");
        }

        let key = match body.get(KEY_FIELD) {
            Some(Value::String(k)) => k.clone(),
            Some(_) => return error_response(400, ERROR_HANDLE_BAD, "illegal document key"),
            None => state.next_key(),
        };
        let Ok(handle) = DocumentHandle::parse(&format!("{}/{}", collection, key)) else {
            return error_response(400, ERROR_HANDLE_BAD, "illegal document key");
        };
        let rev = state.next_rev();

        let mut doc: Map<String, Value> = body
            .into_iter()
            .filter(|(k, _)| !RESERVED_FIELDS.contains(&k.as_str()))
            .collect();
        doc.insert(ID_FIELD.to_string(), json!(handle.to_string()));
        doc.insert(KEY_FIELD.to_string(), json!(key));
        doc.insert(REV_FIELD.to_string(), json!(rev));

        let docs = state.collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&key) {
            return error_response(409, ERROR_UNIQUE_CONSTRAINT, "unique constraint violated");
        }
        let response_body = success_body(identity_of(&doc), None);
        docs.insert(key, doc);

        debug!(handle = %handle, rev = %rev, "memory store created document");

        let status = if options.wait_for_sync { 201 } else { 202 };
        HttpResponse::new(status, response_body).with_header("ETag", etag(&rev))
    }

    fn modify(
        &self,
        handle: &DocumentHandle,
        request: &HttpRequest,
        options: &RequestOptions,
        partial: bool,
    ) -> HttpResponse {
        let Some(Value::Object(body)) = request.body.clone() else {
            return error_response(400, ERROR_CORRUPTED_JSON, "expecting a JSON object body");
        };

        let mut state = self.lock();
        match lookup(&state, handle) {
            None => return not_found(true),
            Some(doc) => {
                if let Some(conflict) = precondition_failure(doc, options) {
                    return conflict;
                }
            }
        }
        let new_rev = state.next_rev();

        let Some(doc) = lookup_mut(&mut state, handle) else {
            return not_found(true);
        };
        let old_rev = rev_of(doc).to_string();
        let incoming: Map<String, Value> = body
            .into_iter()
            .filter(|(k, _)| !RESERVED_FIELDS.contains(&k.as_str()))
            .collect();

        if partial {
            merge_patch(doc, incoming, options.keep_null, options.merge_objects);
        } else {
            let identity = identity_of(doc);
            *doc = incoming;
            doc.extend(identity);
        }
        doc.insert(REV_FIELD.to_string(), json!(new_rev));

        debug!(handle = %handle, old_rev = %old_rev, rev = %new_rev, partial, "memory store modified document");

        let status = if options.wait_for_sync { 201 } else { 202 };
        HttpResponse::new(status, success_body(identity_of(doc), Some(&old_rev)))
            .with_header("ETag", etag(&new_rev))
    }

    fn remove(&self, handle: &DocumentHandle, options: &RequestOptions) -> HttpResponse {
        let mut state = self.lock();
        match lookup(&state, handle) {
            None => return not_found(true),
            Some(doc) => {
                if let Some(conflict) = precondition_failure(doc, options) {
                    return conflict;
                }
            }
        }

        let Some(doc) = state
            .collections
            .get_mut(handle.collection())
            .and_then(|docs| docs.remove(handle.key()))
        else {
            return not_found(true);
        };

        debug!(handle = %handle, "memory store removed document");

        let status = if options.wait_for_sync { 200 } else { 202 };
        let rev = rev_of(&doc).to_string();
        HttpResponse::new(status, success_body(identity_of(&doc), None)).with_header("ETag", etag(&rev))
    }
}

fn strip_database_prefix(path: &str) -> &str {
    if let Some(rest) = path.strip_prefix("/_db/") {
        match rest.find('/') {
            Some(idx) => &rest[idx..],
            None => "",
        }
    } else {
        path
    }
}

fn lookup<'a>(state: &'a StoreState, handle: &DocumentHandle) -> Option<&'a Map<String, Value>> {
    state
        .collections
        .get(handle.collection())
        .and_then(|docs| docs.get(handle.key()))
}

fn lookup_mut<'a>(
    state: &'a mut StoreState,
    handle: &DocumentHandle,
) -> Option<&'a mut Map<String, Value>> {
    state
        .collections
        .get_mut(handle.collection())
        .and_then(|docs| docs.get_mut(handle.key()))
}

fn not_found(with_body: bool) -> HttpResponse {
    if with_body {
        error_response(404, ERROR_DOCUMENT_NOT_FOUND, "document not found")
    } else {
        HttpResponse::new(404, Value::Null)
    }
}

/// 412 response when `If-Match` disagrees and the policy does not override
fn precondition_failure(doc: &Map<String, Value>, options: &RequestOptions) -> Option<HttpResponse> {
    let tag = options.if_match.as_ref()?;
    let rev = rev_of(doc);
    if tag.as_str() == rev || options.policy_last {
        return None;
    }
    let mut body = error_body(412, ERROR_CONFLICT, "precondition failed");
    body.extend(identity_of(doc));
    Some(HttpResponse::new(412, Value::Object(body)).with_header("ETag", etag(rev)))
}

fn success_body(identity: Map<String, Value>, old_rev: Option<&str>) -> Value {
    let mut body = Map::new();
    body.insert("error".to_string(), Value::Bool(false));
    body.extend(identity);
    if let Some(old_rev) = old_rev {
        body.insert("_oldRev".to_string(), json!(old_rev));
    }
    Value::Object(body)
}

impl Transport for MemoryStore {
    fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        Ok(self.handle(&request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::with_collections(&["docs"])
    }

    fn create(store: &MemoryStore, body: Value) -> Map<String, Value> {
        let resp = store
            .send(
                HttpRequest::new(Method::Post, DOCUMENT_API)
                    .query("collection", "docs")
                    .body(body),
            )
            .unwrap();
        assert_eq!(resp.status, 202);
        resp.body.as_object().unwrap().clone()
    }

    #[test]
    fn test_create_assigns_identity() {
        let store = store();
        let body = create(&store, json!({"foo": "x"}));
        assert_eq!(body["error"], json!(false));
        assert!(body["_id"].as_str().unwrap().starts_with("docs/"));
        assert!(body["_key"].is_string());
        assert!(body["_rev"].is_string());
        assert_eq!(store.count("docs"), 1);
    }

    #[test]
    fn test_create_unknown_collection() {
        let store = store();
        let resp = store
            .send(
                HttpRequest::new(Method::Post, DOCUMENT_API)
                    .query("collection", "missing")
                    .body(json!({})),
            )
            .unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body["errorNum"], json!(ERROR_COLLECTION_NOT_FOUND));
    }

    #[test]
    fn test_get_preconditions() {
        let store = store();
        let created = create(&store, json!({"foo": "x"}));
        let path = format!("{}/{}", DOCUMENT_API, created["_id"].as_str().unwrap());
        let rev = RevisionTag::new(created["_rev"].as_str().unwrap());

        let resp = store
            .send(HttpRequest::new(Method::Get, &path).header("If-None-Match", rev.to_header_value()))
            .unwrap();
        assert_eq!(resp.status, 304);
        assert!(resp.body.is_null());

        let resp = store
            .send(HttpRequest::new(Method::Get, &path).header("If-Match", "\"bogus\""))
            .unwrap();
        assert_eq!(resp.status, 412);
        assert_eq!(resp.body["_rev"], json!(rev.as_str()));

        let resp = store.send(HttpRequest::new(Method::Get, &path)).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["foo"], json!("x"));
        assert_eq!(resp.header_value("etag"), Some(rev.to_header_value().as_str()));
    }

    #[test]
    fn test_replace_policy_last_overrides() {
        let store = store();
        let created = create(&store, json!({"foo": "x"}));
        let path = format!("{}/{}", DOCUMENT_API, created["_id"].as_str().unwrap());

        let resp = store
            .send(
                HttpRequest::new(Method::Put, &path)
                    .header("If-Match", "\"bogus\"")
                    .body(json!({"foo": "y"})),
            )
            .unwrap();
        assert_eq!(resp.status, 412);

        let resp = store
            .send(
                HttpRequest::new(Method::Put, &path)
                    .header("If-Match", "\"bogus\"")
                    .query("policy", "last")
                    .query("waitForSync", "true")
                    .body(json!({"foo": "y"})),
            )
            .unwrap();
        assert_eq!(resp.status, 201);
        assert_ne!(resp.body["_rev"], created["_rev"]);
        assert_eq!(resp.body["_oldRev"], created["_rev"]);
    }

    #[test]
    fn test_patch_merges() {
        let store = store();
        let created = create(&store, json!({"a": 1, "b": 2, "n": {"x": 1, "y": 2}}));
        let handle = DocumentHandle::parse(created["_id"].as_str().unwrap()).unwrap();
        let path = format!("{}/{}", DOCUMENT_API, handle);

        let resp = store
            .send(
                HttpRequest::new(Method::Patch, &path)
                    .query("keepNull", "false")
                    .body(json!({"b": null, "c": 3, "n": {"y": 5}})),
            )
            .unwrap();
        assert_eq!(resp.status, 202);

        let doc = store.document(&handle).unwrap();
        assert_eq!(doc["a"], json!(1));
        assert!(doc.get("b").is_none());
        assert_eq!(doc["c"], json!(3));
        assert_eq!(doc["n"], json!({"x": 1, "y": 5}));
    }

    #[test]
    fn test_delete() {
        let store = store();
        let created = create(&store, json!({"a": 1}));
        let path = format!("{}/{}", DOCUMENT_API, created["_id"].as_str().unwrap());

        let resp = store
            .send(HttpRequest::new(Method::Delete, &path).query("waitForSync", "true"))
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(store.count("docs"), 0);

        let resp = store.send(HttpRequest::new(Method::Get, &path)).unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body["errorNum"], json!(ERROR_DOCUMENT_NOT_FOUND));
    }

    #[test]
    fn test_database_prefix_is_ignored() {
        assert_eq!(strip_database_prefix("/_db/general/_api/document"), DOCUMENT_API);
        assert_eq!(strip_database_prefix("/_api/document"), DOCUMENT_API);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let store = store();
        let resp = store
            .send(HttpRequest::new(Method::Put, "/_api/document/docs/1").query("policy", "first"))
            .unwrap();
        assert_eq!(resp.status, 400);
    }
}
