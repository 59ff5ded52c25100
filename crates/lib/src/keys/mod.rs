//! Key store for derived API credentials
//!
//! Issues credential documents tied to a user account and revokes them in bulk.
//! Credential documents live in the auth database under the `org.couchdb.user:`
//! namespace; callers only ever see bare key ids.

pub mod errors;
pub mod types;

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

pub use errors::KeyError;
pub use types::{CredentialDocument, Revocation};

use crate::{
    Result,
    backend::{Document, DocumentStore},
    constants::{USER_DOC_TYPE, user_doc_id, user_role},
    util::NameList,
};

/// Issues and revokes credential documents in an auth database.
#[derive(Clone)]
pub struct KeyStore {
    store: Arc<dyn DocumentStore>,
}

impl KeyStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The auth database this key store writes to.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Create a credential document for `username`.
    ///
    /// The stored roles are `user:<username>` followed by a copy of `roles`; `None` is
    /// treated as no extra roles. Duplicates are kept as given.
    ///
    /// # Arguments
    /// * `username` - Owning account, must not be empty
    /// * `key_id` - Caller-chosen credential id, must not be empty
    /// * `password` - Credential secret, stored as given
    /// * `expires` - Expiry marker, stored as given
    /// * `roles` - Extra roles granted to the credential
    ///
    /// # Returns
    /// The written document with its id set to the bare `key_id`. Store failures, such as
    /// a conflict when the key id is already taken, are returned unchanged.
    pub async fn issue(
        &self,
        username: &str,
        key_id: &str,
        password: &str,
        expires: impl Into<Value>,
        roles: Option<&[String]>,
    ) -> Result<CredentialDocument> {
        if username.is_empty() {
            return Err(KeyError::EmptyUsername.into());
        }
        if key_id.is_empty() {
            return Err(KeyError::EmptyKeyId.into());
        }

        let mut all_roles = Vec::with_capacity(1 + roles.map_or(0, <[String]>::len));
        all_roles.push(user_role(username));
        all_roles.extend(roles.unwrap_or_default().iter().cloned());

        let mut credential = CredentialDocument {
            id: user_doc_id(key_id),
            rev: None,
            doc_type: USER_DOC_TYPE.to_string(),
            name: key_id.to_string(),
            user_id: username.to_string(),
            password: password.to_string(),
            expires: expires.into(),
            roles: all_roles,
        };

        let doc = Document::from_typed(&credential)?;
        let response = self.store.put(doc).await.inspect_err(|err| {
            error!(key_id, username, error = %err, "Failed to store credential document");
        })?;
        debug!(key_id, username, rev = %response.rev, "Issued credential");

        credential.id = key_id.to_string();
        credential.rev = Some(response.rev);
        Ok(credential)
    }

    /// Delete the credential documents for one or more key ids.
    ///
    /// Looks up all ids in one round trip and deletes the live ones in a single bulk write.
    /// Unknown and already deleted keys are skipped, and repeated ids are only deleted once.
    /// Nothing is written if no key is live.
    ///
    /// # Returns
    /// [`Revocation::NothingToRevoke`] when no deletion was needed, otherwise the per-key
    /// results of the bulk write, which the caller should inspect for partial failure.
    pub async fn revoke(&self, key_ids: impl Into<NameList>) -> Result<Revocation> {
        let key_ids: NameList = key_ids.into();
        let mut seen = HashSet::new();
        let doc_ids: Vec<String> = key_ids
            .iter()
            .filter(|key_id| seen.insert(*key_id))
            .map(|key_id| user_doc_id(key_id))
            .collect();

        let existing = self.store.all_docs(&doc_ids).await.inspect_err(|err| {
            error!(keys = ?doc_ids, error = %err, "Failed to look up credential documents");
        })?;

        let deletions: Vec<Document> = existing
            .rows
            .iter()
            .filter_map(|row| row.live_rev().map(|rev| Document::tombstone(&row.id, rev)))
            .collect();

        if deletions.is_empty() {
            debug!(keys = ?doc_ids, "No live credentials to revoke");
            return Ok(Revocation::NothingToRevoke);
        }

        let count = deletions.len();
        let results = self.store.bulk_docs(deletions).await.inspect_err(|err| {
            error!(keys = ?doc_ids, error = %err, "Failed to delete credential documents");
        })?;
        debug!(requested = doc_ids.len(), deleted = count, "Revoked credentials");

        Ok(Revocation::Submitted(results))
    }
}
