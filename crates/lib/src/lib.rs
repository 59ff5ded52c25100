//!
//! dbauth: API key issuance and access control for CouchDB-style document databases.
//!
//! ## Core Concepts
//!
//! * **Document stores (`backend::DocumentStore`)**: The pluggable client used for every read and write.
//!   Stores hand out a revision token with each document and reject writes carrying a stale one.
//! * **Credential documents (`keys::CredentialDocument`)**: Revocable API keys derived from a user account,
//!   stored in the auth database under the `org.couchdb.user:` namespace.
//! * **Key store (`keys::KeyStore`)**: Issues and revokes credential documents.
//! * **Security documents (`security::SecurityDocument`)**: The `_security` singleton of a database that lists
//!   the admin and member names and roles.
//! * **Security reconciler (`security::SecurityReconciler`)**: Idempotent set-union and set-removal
//!   operations on a security document, written back only when something changed.
//!
//! Nothing in this crate retries on a write conflict. A caller that loses a race sees the store's
//! conflict error and may re-run the whole operation.

pub mod backend;
pub mod constants;
pub mod keys;
pub mod security;
pub mod util;

pub use backend::{Document, DocumentStore, InMemory};
pub use keys::{CredentialDocument, KeyStore, Revocation};
pub use security::{Reconciled, SecurityDocument, SecurityReconciler};
pub use util::NameList;

/// Result type used throughout the dbauth library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the dbauth library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured document store errors from the backend module
    #[error(transparent)]
    Store(backend::StoreError),

    /// Structured key store errors from the keys module
    #[error(transparent)]
    Key(keys::KeyError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "backend",
            Error::Key(_) => "keys",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a document was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a revision conflict.
    ///
    /// Callers that want retry-on-conflict re-run the whole operation when this is true.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error came from the document store.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this error is an input validation failure.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Key(key_err) => key_err.is_validation_error(),
            Error::Store(store_err) => store_err.is_invalid_document(),
            _ => false,
        }
    }
}
