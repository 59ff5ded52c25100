//! Document store error types.
//!
//! These mirror the native failure modes of a CouchDB-style store: missing documents,
//! stale revisions, malformed documents and an unreachable store.

use thiserror::Error;

/// Errors that can occur during document store operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document not found by id, or it has been deleted.
    #[error("Document not found: {id}")]
    NotFound {
        /// The id of the document that was not found
        id: String,
    },

    /// The supplied revision does not match the stored one.
    #[error("Document update conflict: {id}")]
    Conflict {
        /// The id of the document whose write was rejected
        id: String,
    },

    /// The document cannot be written as given.
    #[error("Invalid document: {reason}")]
    InvalidDocument {
        /// Why the document was rejected
        reason: String,
    },

    /// The store could not be reached or failed internally.
    #[error("Document store unavailable: {reason}")]
    Unavailable {
        /// Description of the transport or storage failure
        reason: String,
    },
}

impl StoreError {
    /// Check if this error indicates a document was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Check if this error indicates a stale or missing revision.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Check if this error indicates a malformed document.
    pub fn is_invalid_document(&self) -> bool {
        matches!(self, StoreError::InvalidDocument { .. })
    }

    /// Check if this error is a transport or storage failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }

    /// Get the document id if this error is about a specific document.
    pub fn document_id(&self) -> Option<&str> {
        match self {
            StoreError::NotFound { id } | StoreError::Conflict { id } => Some(id),
            _ => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
