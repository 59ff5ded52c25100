//! Constants used throughout the dbauth library.
//!
//! Reserved document ids and naming conventions shared with the document store.

/// Namespace prefix for credential documents in the auth database.
pub const USER_PREFIX: &str = "org.couchdb.user:";

/// Fixed id of the per-database security document.
pub const SECURITY_DOC_ID: &str = "_security";

/// `type` tag carried by every credential document.
pub const USER_DOC_TYPE: &str = "user";

/// Prefix of the implicit owner role seeded into each credential document.
pub const USER_ROLE_PREFIX: &str = "user:";

/// Error tag reported by `all_docs` rows for unknown ids.
pub const NOT_FOUND: &str = "not_found";

/// Error tag reported for revision conflicts.
pub const CONFLICT: &str = "conflict";

/// Namespaced document id for a credential key id.
pub fn user_doc_id(key_id: &str) -> String {
    format!("{USER_PREFIX}{key_id}")
}

/// Implicit owner role for a username.
pub fn user_role(username: &str) -> String {
    format!("{USER_ROLE_PREFIX}{username}")
}
