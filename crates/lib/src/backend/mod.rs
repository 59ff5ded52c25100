//! Document store client abstraction.
//!
//! This module provides the `DocumentStore` trait that the key store and the security
//! reconciler talk to, the JSON `Document` type they exchange, and an in-memory
//! implementation with CouchDB-compatible revision semantics.
//!
//! The trait only names the operations this crate needs: single-document get and put with
//! optimistic revision checking, multi-get by key list and bulk multi-document write.

use std::any::Any;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::Result;

mod errors;
pub mod in_memory;

pub use errors::StoreError;
pub use in_memory::InMemory;

const ID_FIELD: &str = "_id";
const REV_FIELD: &str = "_rev";
const DELETED_FIELD: &str = "_deleted";

/// A schemaless JSON document as exchanged with the store.
///
/// The reserved `_id`, `_rev` and `_deleted` fields carry the identifier, the revision token
/// and the deletion marker. Every other field is opaque to the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document with no id.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Create an empty document with the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut doc = Self::new();
        doc.set_id(id);
        doc
    }

    /// Create a deletion marker for `id` at revision `rev`.
    pub fn tombstone(id: impl Into<String>, rev: impl Into<String>) -> Self {
        let mut doc = Self::with_id(id);
        doc.set_rev(rev);
        doc.0.insert(DELETED_FIELD.to_string(), Value::Bool(true));
        doc
    }

    /// Serialize a typed value into a document.
    ///
    /// Fails with `StoreError::InvalidDocument` if the value is not a JSON object.
    pub fn from_typed<T: Serialize>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(StoreError::InvalidDocument {
                reason: format!("expected a JSON object, got {other}"),
            }
            .into()),
        }
    }

    /// Deserialize this document into a typed value.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0))?)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.0.insert(ID_FIELD.to_string(), Value::String(id.into()));
    }

    pub fn rev(&self) -> Option<&str> {
        self.0.get(REV_FIELD).and_then(Value::as_str)
    }

    pub fn set_rev(&mut self, rev: impl Into<String>) {
        self.0
            .insert(REV_FIELD.to_string(), Value::String(rev.into()));
    }

    /// Whether this document carries `_deleted: true`.
    pub fn is_deleted(&self) -> bool {
        self.0
            .get(DELETED_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Result of a successful single-document write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutResponse {
    pub id: String,
    pub rev: String,
}

/// Response of a multi-get by key list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllDocsResponse {
    /// One row per requested key, in request order.
    pub rows: Vec<AllDocsRow>,
}

/// A single `all_docs` row.
///
/// Unknown keys carry `error` and no `value`. Known keys carry `value`, including
/// deleted documents, which report `deleted: true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RowValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AllDocsRow {
    /// The current revision if the row names a live document.
    pub fn live_rev(&self) -> Option<&str> {
        match (&self.error, &self.value) {
            (None, Some(value)) if !value.deleted => Some(value.rev.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowValue {
    pub rev: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

/// Per-document status of a bulk write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDocResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BulkDocResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Client for a CouchDB-style document database.
///
/// Every document returned by the store carries its current revision in `_rev`. Writes are
/// checked against that revision and fail with `StoreError::Conflict` when it is stale, or when
/// a live document already exists and no revision was supplied.
///
/// Implementations must be `Send` and `Sync` so one client can be shared by concurrent callers,
/// and implement `Any` to allow downcasting to the concrete store.
#[async_trait]
pub trait DocumentStore: Send + Sync + Any {
    /// Retrieves a live document by id.
    ///
    /// # Returns
    /// The document including `_id` and `_rev`, or `StoreError::NotFound` if it is absent or deleted.
    async fn get(&self, id: &str) -> Result<Document>;

    /// Writes a document under its own `_id`.
    ///
    /// A document with `_deleted: true` deletes the stored document.
    async fn put(&self, doc: Document) -> Result<PutResponse>;

    /// Writes a document under an explicit id, overriding any `_id` it carries.
    async fn put_with_id(&self, id: &str, mut doc: Document) -> Result<PutResponse> {
        doc.set_id(id);
        self.put(doc).await
    }

    /// Looks up the current revision of each key in one round trip.
    async fn all_docs(&self, keys: &[String]) -> Result<AllDocsResponse>;

    /// Writes many documents in one round trip.
    ///
    /// Per-document failures are reported in the returned list, in input order,
    /// rather than failing the whole call.
    async fn bulk_docs(&self, docs: Vec<Document>) -> Result<Vec<BulkDocResult>>;

    /// Returns a reference to the store as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
