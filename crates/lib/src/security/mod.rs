//! Security document reconciliation
//!
//! Keeps a database's `_security` document in step with application-level authorization
//! decisions. Every operation reads the document once, applies an idempotent set-union or
//! set-removal in memory and writes it back only if something changed, guarded by the
//! revision it was read at.
//!
//! A concurrent writer that wins the race makes the losing write fail with the store's
//! conflict error. Nothing here retries; callers that need it re-run the whole operation.
//! [`SecurityReconciler::load`] and [`SecurityReconciler::commit`] expose the two halves
//! for callers that want to drive the cycle themselves.

mod document;

use std::sync::Arc;

use tracing::{debug, error};

pub use document::{SecurityDocument, SecurityGroup};

use crate::{
    Result,
    backend::{Document, DocumentStore},
    constants::SECURITY_DOC_ID,
    util::NameList,
};

/// Outcome of a reconciliation operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Reconciled {
    /// The document already satisfied the request; nothing was written.
    Unchanged,
    /// The document was written back; carries it with its new revision.
    Updated(SecurityDocument),
}

impl Reconciled {
    pub fn changed(&self) -> bool {
        matches!(self, Reconciled::Updated(_))
    }

    /// The written document, if a write happened.
    pub fn document(&self) -> Option<&SecurityDocument> {
        match self {
            Reconciled::Unchanged => None,
            Reconciled::Updated(doc) => Some(doc),
        }
    }
}

/// Reconciles the `_security` document of one database.
#[derive(Clone)]
pub struct SecurityReconciler {
    store: Arc<dyn DocumentStore>,
}

impl SecurityReconciler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Read the current security document, including its revision.
    pub async fn load(&self) -> Result<SecurityDocument> {
        self.store.get(SECURITY_DOC_ID).await?.into_typed()
    }

    /// Write `doc` back at the revision it carries.
    ///
    /// Fails with the store's conflict error if the document changed since it was loaded.
    ///
    /// # Returns
    /// The document as written, carrying its new revision.
    pub async fn commit(&self, mut doc: SecurityDocument) -> Result<SecurityDocument> {
        let body = Document::from_typed(&doc)?;
        let response = self.store.put_with_id(SECURITY_DOC_ID, body).await?;
        doc.id = Some(response.id);
        doc.rev = Some(response.rev);
        Ok(doc)
    }

    /// Add admin roles and member roles that are not yet listed.
    pub async fn ensure_roles(
        &self,
        admin_roles: impl Into<NameList>,
        member_roles: impl Into<NameList>,
    ) -> Result<Reconciled> {
        let admin_roles = admin_roles.into();
        let member_roles = member_roles.into();
        self.reconcile("ensure_roles", |doc| {
            doc.ensure_roles(&admin_roles, &member_roles)
        })
        .await
    }

    /// Add key ids to the member names.
    ///
    /// Accepts a single key, a sequence, or a map whose keys are the key ids.
    pub async fn authorize(&self, keys: impl Into<NameList>) -> Result<Reconciled> {
        let keys = keys.into();
        self.reconcile("authorize", |doc| doc.authorize(&keys)).await
    }

    /// Remove key ids from the member names.
    pub async fn deauthorize(&self, keys: impl Into<NameList>) -> Result<Reconciled> {
        let keys = keys.into();
        self.reconcile("deauthorize", |doc| doc.deauthorize(&keys)).await
    }

    /// Load, mutate and conditionally commit.
    ///
    /// Store failures from either step are logged here and returned unchanged.
    async fn reconcile<F>(&self, operation: &'static str, mutate: F) -> Result<Reconciled>
    where
        F: FnOnce(&mut SecurityDocument) -> bool,
    {
        self.apply(operation, mutate).await.inspect_err(|err| {
            error!(operation, error = %err, "Failed to reconcile security document");
        })
    }

    async fn apply<F>(&self, operation: &'static str, mutate: F) -> Result<Reconciled>
    where
        F: FnOnce(&mut SecurityDocument) -> bool,
    {
        let mut doc = self.load().await?;
        if !mutate(&mut doc) {
            debug!(operation, "Security document already up to date");
            return Ok(Reconciled::Unchanged);
        }
        let written = self.commit(doc).await?;
        debug!(operation, rev = ?written.rev, "Security document updated");
        Ok(Reconciled::Updated(written))
    }
}
