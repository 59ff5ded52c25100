//! Core data types for the key store

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::BulkDocResult;

/// A derived, revocable API credential stored in the auth database.
///
/// In storage `id` is the namespaced `org.couchdb.user:<key id>`. Values handed back by
/// [`KeyStore::issue`](super::KeyStore::issue) carry the bare key id instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CredentialDocument {
    #[serde(rename = "_id")]
    pub id: String,

    /// Revision assigned by the store, if the document has been written
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    /// Always `"user"`
    #[serde(rename = "type")]
    pub doc_type: String,

    /// The key id, repeated for parity with regular user documents
    pub name: String,

    /// Username of the owning account
    pub user_id: String,

    /// Credential secret, stored as given
    pub password: String,

    /// Expiry marker, stored as given
    pub expires: Value,

    /// `user:<username>` followed by the caller-supplied roles
    pub roles: Vec<String>,
}

impl CredentialDocument {
    /// The owner role every credential starts with.
    pub fn owner_role(&self) -> Option<&str> {
        self.roles.first().map(String::as_str)
    }
}

/// Outcome of [`KeyStore::revoke`](super::KeyStore::revoke).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Revocation {
    /// None of the requested keys named a live credential; nothing was written.
    NothingToRevoke,
    /// A bulk deletion was submitted. The store reports each deletion separately and
    /// some of them may have failed.
    Submitted(Vec<BulkDocResult>),
}

impl Revocation {
    /// Whether a deletion was submitted to the store.
    pub fn revoked(&self) -> bool {
        matches!(self, Revocation::Submitted(_))
    }

    /// Per-document results of the bulk deletion, empty if nothing was submitted.
    pub fn results(&self) -> &[BulkDocResult] {
        match self {
            Revocation::NothingToRevoke => &[],
            Revocation::Submitted(results) => results,
        }
    }

    /// Results of deletions the store rejected.
    pub fn failures(&self) -> impl Iterator<Item = &BulkDocResult> {
        self.results().iter().filter(|result| !result.is_ok())
    }
}
