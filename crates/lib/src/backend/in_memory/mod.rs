//! In-memory document store implementation
//!
//! This module provides an in-memory implementation of the DocumentStore trait,
//! suitable for testing, development, or single-process deployments where the
//! state is saved to and loaded from a JSON file.

mod persistence;

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::Result;
use crate::backend::{
    AllDocsResponse, AllDocsRow, BulkDocResult, Document, DocumentStore, PutResponse, RowValue,
    StoreError,
};
use crate::constants::{CONFLICT, NOT_FOUND, SECURITY_DOC_ID};

/// A stored revision of a document.
///
/// Reserved fields are kept out of `body`; they are re-attached on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredDoc {
    /// Monotonic revision generation, the numeric prefix of `rev`
    pub(crate) generation: u64,
    pub(crate) rev: String,
    #[serde(default)]
    pub(crate) deleted: bool,
    #[serde(default)]
    pub(crate) body: Map<String, Value>,
}

/// A simple in-memory document store using a `HashMap` keyed by document id.
///
/// Revision tokens follow the CouchDB shape `<generation>-<random hex>`. Deleted documents
/// are kept as tombstones so `all_docs` can report them and a later write may recreate them.
///
/// A `_security` document with no fields is created along with the store, the same way a
/// database server creates one for every new database.
#[derive(Debug)]
pub struct InMemory {
    /// Documents keyed by id, including tombstones
    pub(crate) docs: RwLock<HashMap<String, StoredDoc>>,
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemory {
    /// Creates a new store holding only an empty `_security` document.
    pub fn new() -> Self {
        let mut docs = HashMap::new();
        docs.insert(
            SECURITY_DOC_ID.to_string(),
            StoredDoc {
                generation: 1,
                rev: new_rev(1),
                deleted: false,
                body: Map::new(),
            },
        );
        Self {
            docs: RwLock::new(docs),
        }
    }

    /// Creates a store with no documents at all, not even `_security`.
    pub fn empty() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the ids of all live documents, sorted.
    pub async fn document_ids(&self) -> Vec<String> {
        let docs = self.docs.read().await;
        let mut ids: Vec<String> = docs
            .iter()
            .filter(|(_, stored)| !stored.deleted)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Saves every document, tombstones included, to a JSON file.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads a store from a JSON file.
    ///
    /// If the file does not exist, a new store from [`InMemory::new`] is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

fn new_rev(generation: u64) -> String {
    format!("{generation}-{}", Uuid::new_v4().simple())
}

/// Applies one write to the document map under the revision rules of the store.
fn write(
    docs: &mut HashMap<String, StoredDoc>,
    doc: Document,
) -> std::result::Result<PutResponse, StoreError> {
    let id = match doc.id() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(StoreError::InvalidDocument {
                reason: "document has no _id".to_string(),
            });
        }
    };
    let deleting = doc.is_deleted();
    let supplied_rev = doc.rev().map(str::to_string);
    let existing = docs.get(&id);

    match (existing, supplied_rev.as_deref()) {
        // A live document can only be replaced at its current revision
        (Some(stored), rev) if !stored.deleted => {
            if rev != Some(stored.rev.as_str()) {
                return Err(StoreError::Conflict { id });
            }
        }
        (Some(stored), Some(rev)) if rev != stored.rev => {
            return Err(StoreError::Conflict { id });
        }
        (Some(_), _) if deleting => return Err(StoreError::NotFound { id }),
        (Some(_), _) => {}
        (None, Some(_)) => return Err(StoreError::Conflict { id }),
        (None, None) if deleting => return Err(StoreError::NotFound { id }),
        (None, None) => {}
    }

    let generation = existing.map_or(0, |stored| stored.generation) + 1;
    let rev = new_rev(generation);
    let body = if deleting {
        Map::new()
    } else {
        let mut body = doc.into_map();
        body.remove("_id");
        body.remove("_rev");
        body.remove("_deleted");
        body
    };

    docs.insert(
        id.clone(),
        StoredDoc {
            generation,
            rev: rev.clone(),
            deleted: deleting,
            body,
        },
    );
    Ok(PutResponse { id, rev })
}

#[async_trait]
impl DocumentStore for InMemory {
    async fn get(&self, id: &str) -> Result<Document> {
        let docs = self.docs.read().await;
        match docs.get(id) {
            Some(stored) if !stored.deleted => {
                let mut doc = Document::from(stored.body.clone());
                doc.set_id(id);
                doc.set_rev(stored.rev.clone());
                Ok(doc)
            }
            _ => Err(StoreError::NotFound { id: id.to_string() }.into()),
        }
    }

    async fn put(&self, doc: Document) -> Result<PutResponse> {
        let mut docs = self.docs.write().await;
        Ok(write(&mut docs, doc)?)
    }

    async fn all_docs(&self, keys: &[String]) -> Result<AllDocsResponse> {
        let docs = self.docs.read().await;
        let rows = keys
            .iter()
            .map(|key| match docs.get(key) {
                Some(stored) => AllDocsRow {
                    id: key.clone(),
                    value: Some(RowValue {
                        rev: stored.rev.clone(),
                        deleted: stored.deleted,
                    }),
                    error: None,
                },
                None => AllDocsRow {
                    id: key.clone(),
                    value: None,
                    error: Some(NOT_FOUND.to_string()),
                },
            })
            .collect();
        Ok(AllDocsResponse { rows })
    }

    async fn bulk_docs(&self, docs: Vec<Document>) -> Result<Vec<BulkDocResult>> {
        let mut stored = self.docs.write().await;
        let results = docs
            .into_iter()
            .map(|doc| {
                let id = doc.id().unwrap_or_default().to_string();
                match write(&mut stored, doc) {
                    Ok(response) => BulkDocResult {
                        id: response.id,
                        rev: Some(response.rev),
                        error: None,
                        reason: None,
                    },
                    Err(err) => BulkDocResult {
                        id,
                        rev: None,
                        error: Some(
                            match err {
                                StoreError::Conflict { .. } => CONFLICT,
                                StoreError::NotFound { .. } => NOT_FOUND,
                                _ => "bad_request",
                            }
                            .to_string(),
                        ),
                        reason: Some(err.to_string()),
                    },
                }
            })
            .collect();
        Ok(results)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
