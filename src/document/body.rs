//! Document body with typed field access
//!
//! A document is a JSON object. Reads go through typed accessors that either
//! return the value as the requested type or fail with a `DocumentError`;
//! the `is_*` predicates never fail.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{DocumentError, DocumentResult};
use super::handle::DocumentHandle;
use super::revision::RevisionTag;

/// Store-managed document handle field
pub const ID_FIELD: &str = "_id";
/// Store-managed key field
pub const KEY_FIELD: &str = "_key";
/// Store-managed revision field
pub const REV_FIELD: &str = "_rev";

/// Fields the store owns; callers never supply them on create
pub const RESERVED_FIELDS: [&str; 3] = [ID_FIELD, KEY_FIELD, REV_FIELD];

/// Human readable name of a JSON value's type
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A document: field name to tagged value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Creates an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing JSON object
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    // ==================
    // Builders
    // ==================

    /// Sets a field to any JSON-convertible value
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets a string field
    pub fn with_string(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(field, Value::String(value.into()))
    }

    /// Sets an integer field
    pub fn with_int(self, field: impl Into<String>, value: i64) -> Self {
        self.with(field, value)
    }

    /// Sets a float field
    pub fn with_float(self, field: impl Into<String>, value: f64) -> Self {
        self.with(field, value)
    }

    /// Sets a bool field
    pub fn with_bool(self, field: impl Into<String>, value: bool) -> Self {
        self.with(field, value)
    }

    /// Sets a field to null
    pub fn with_null(self, field: impl Into<String>) -> Self {
        self.with(field, Value::Null)
    }

    /// Sets a field in place, returning the previous value
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Removes a field, returning its value
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    // ==================
    // Predicates
    // ==================

    /// Whether the field exists (null counts as present)
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_string(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Value::String(_)))
    }

    pub fn is_int(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Value::Number(n)) if n.is_i64())
    }

    pub fn is_float(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Value::Number(_)))
    }

    pub fn is_bool(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Value::Bool(_)))
    }

    pub fn is_null(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Value::Null))
    }

    pub fn is_object(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Value::Object(_)))
    }

    pub fn is_array(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(Value::Array(_)))
    }

    // ==================
    // Typed accessors
    // ==================

    /// Raw value of a field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    fn require(&self, field: &str) -> DocumentResult<&Value> {
        self.fields
            .get(field)
            .ok_or_else(|| DocumentError::MissingField(field.to_string()))
    }

    fn mismatch(field: &str, expected: &'static str, actual: &Value) -> DocumentError {
        DocumentError::FieldType {
            field: field.to_string(),
            expected,
            actual: type_name(actual),
        }
    }

    /// Reads a string field
    pub fn string(&self, field: &str) -> DocumentResult<&str> {
        match self.require(field)? {
            Value::String(s) => Ok(s),
            other => Err(Self::mismatch(field, "string", other)),
        }
    }

    /// Reads an integer field
    pub fn int(&self, field: &str) -> DocumentResult<i64> {
        let value = self.require(field)?;
        value
            .as_i64()
            .ok_or_else(|| Self::mismatch(field, "integer", value))
    }

    /// Reads a numeric field as float; integers widen
    pub fn float(&self, field: &str) -> DocumentResult<f64> {
        let value = self.require(field)?;
        value
            .as_f64()
            .ok_or_else(|| Self::mismatch(field, "float", value))
    }

    /// Reads a bool field
    pub fn bool(&self, field: &str) -> DocumentResult<bool> {
        let value = self.require(field)?;
        value
            .as_bool()
            .ok_or_else(|| Self::mismatch(field, "bool", value))
    }

    /// Reads a nested object field
    pub fn object(&self, field: &str) -> DocumentResult<&Map<String, Value>> {
        let value = self.require(field)?;
        value
            .as_object()
            .ok_or_else(|| Self::mismatch(field, "object", value))
    }

    /// Reads a list field
    pub fn array(&self, field: &str) -> DocumentResult<&Vec<Value>> {
        let value = self.require(field)?;
        value
            .as_array()
            .ok_or_else(|| Self::mismatch(field, "array", value))
    }

    // ==================
    // Identity
    // ==================

    /// Parsed `_id`
    pub fn handle(&self) -> DocumentResult<DocumentHandle> {
        DocumentHandle::parse(self.string(ID_FIELD)?)
    }

    /// `_key`
    pub fn key(&self) -> DocumentResult<&str> {
        self.string(KEY_FIELD)
    }

    /// `_rev`
    pub fn revision(&self) -> DocumentResult<RevisionTag> {
        self.string(REV_FIELD).map(RevisionTag::new)
    }

    /// Reserved fields present in this document, in declaration order
    pub fn reserved_fields(&self) -> Vec<&'static str> {
        RESERVED_FIELDS
            .iter()
            .copied()
            .filter(|f| self.fields.contains_key(*f))
            .collect()
    }

    /// Copy without store-managed fields
    pub fn without_reserved(&self) -> Self {
        let fields = self
            .fields
            .iter()
            .filter(|(k, _)| !RESERVED_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { fields }
    }

    /// Copy holding only `_id`, `_key` and `_rev`
    pub fn identity(&self) -> Self {
        let fields = RESERVED_FIELDS
            .iter()
            .filter_map(|f| self.fields.get(*f).map(|v| (f.to_string(), v.clone())))
            .collect();
        Self { fields }
    }

    // ==================
    // Views
    // ==================

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(DocumentError::NotAnObject(type_name(&other))),
        }
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}
