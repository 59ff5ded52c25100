use std::any::Any;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use dbauth::{
    InMemory, KeyStore, Result, SecurityReconciler,
    backend::{AllDocsResponse, BulkDocResult, Document, DocumentStore, PutResponse, StoreError},
};

/// A document store that records every write before passing it to an [`InMemory`] store.
///
/// Writes can be switched to fail with `StoreError::Unavailable` to exercise error paths, and
/// reads can be made to yield so concurrent callers interleave between read and write.
pub struct RecordingStore {
    inner: InMemory,
    puts: Mutex<Vec<Document>>,
    bulk_writes: Mutex<Vec<Vec<Document>>>,
    fail_writes: AtomicBool,
    yield_on_read: AtomicBool,
}

impl RecordingStore {
    pub fn new(inner: InMemory) -> Self {
        Self {
            inner,
            puts: Mutex::new(Vec::new()),
            bulk_writes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            yield_on_read: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &InMemory {
        &self.inner
    }

    /// Documents passed to `put`/`put_with_id`, in call order.
    pub fn puts(&self) -> Vec<Document> {
        self.puts.lock().unwrap().clone()
    }

    /// Batches passed to `bulk_docs`, in call order.
    pub fn bulk_writes(&self) -> Vec<Vec<Document>> {
        self.bulk_writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.puts.lock().unwrap().len() + self.bulk_writes.lock().unwrap().len()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn yield_on_read(&self, enabled: bool) {
        self.yield_on_read.store(enabled, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "writes disabled".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn get(&self, id: &str) -> Result<Document> {
        let doc = self.inner.get(id).await;
        if self.yield_on_read.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        doc
    }

    async fn put(&self, doc: Document) -> Result<PutResponse> {
        self.puts.lock().unwrap().push(doc.clone());
        self.check_writable()?;
        self.inner.put(doc).await
    }

    async fn all_docs(&self, keys: &[String]) -> Result<AllDocsResponse> {
        self.inner.all_docs(keys).await
    }

    async fn bulk_docs(&self, docs: Vec<Document>) -> Result<Vec<BulkDocResult>> {
        self.bulk_writes.lock().unwrap().push(docs.clone());
        self.check_writable()?;
        self.inner.bulk_docs(docs).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Creates a recording store over a fresh database with an empty `_security` document.
pub fn recording_store() -> Arc<RecordingStore> {
    Arc::new(RecordingStore::new(InMemory::new()))
}

/// Creates a key store over a recording auth database.
pub fn setup_key_store() -> (KeyStore, Arc<RecordingStore>) {
    let store = recording_store();
    (KeyStore::new(store.clone()), store)
}

/// Creates a reconciler over a recording database whose `_security` document is `security`.
pub async fn setup_reconciler(security: serde_json::Value) -> (SecurityReconciler, Arc<RecordingStore>) {
    let inner = InMemory::new();
    let current = inner
        .get(dbauth::constants::SECURITY_DOC_ID)
        .await
        .expect("Fresh store should have a security document");

    let mut doc = Document::from(
        security
            .as_object()
            .cloned()
            .expect("Security fixture must be a JSON object"),
    );
    doc.set_rev(current.rev().expect("Security document should have a revision"));
    inner
        .put_with_id(dbauth::constants::SECURITY_DOC_ID, doc)
        .await
        .expect("Failed to seed security document");

    let store = Arc::new(RecordingStore::new(inner));
    (SecurityReconciler::new(store.clone()), store)
}

/// Current `_security` document as raw JSON without the reserved fields.
pub async fn security_json(store: &RecordingStore) -> serde_json::Value {
    let mut map = store
        .get(dbauth::constants::SECURITY_DOC_ID)
        .await
        .expect("Failed to read security document")
        .into_map();
    map.remove("_id");
    map.remove("_rev");
    serde_json::Value::Object(map)
}
