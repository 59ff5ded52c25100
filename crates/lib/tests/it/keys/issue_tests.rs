//! Issuing credential documents

use dbauth::{DocumentStore, constants::USER_PREFIX};
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn test_issue_stores_namespaced_document() {
    let (keys, store) = setup_key_store();
    let roles = vec!["editor".to_string()];
    let credential = keys
        .issue("alice", "key1", "pw", 0, Some(roles.as_slice()))
        .await
        .unwrap();

    assert_eq!(credential.id, "key1");
    assert_eq!(credential.roles, vec!["user:alice", "editor"]);

    let stored = store
        .get(&format!("{USER_PREFIX}key1"))
        .await
        .unwrap()
        .into_map();
    assert_eq!(stored["_id"], json!("org.couchdb.user:key1"));
    assert_eq!(stored["type"], json!("user"));
    assert_eq!(stored["name"], json!("key1"));
    assert_eq!(stored["user_id"], json!("alice"));
    assert_eq!(stored["password"], json!("pw"));
    assert_eq!(stored["expires"], json!(0));
    assert_eq!(stored["roles"], json!(["user:alice", "editor"]));
    assert_eq!(stored["_rev"], json!(credential.rev.unwrap()));

    // Exactly one document written
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.puts().len(), 1);
}

#[tokio::test]
async fn test_issue_without_roles_has_only_owner_role() {
    let (keys, _store) = setup_key_store();
    let credential = keys
        .issue("bob", "key2", "secret", "2030-01-01T00:00:00Z", None)
        .await
        .unwrap();
    assert_eq!(credential.roles, vec!["user:bob"]);
    assert_eq!(credential.expires, json!("2030-01-01T00:00:00Z"));
}

#[tokio::test]
async fn test_issue_keeps_duplicate_roles() {
    let (keys, _store) = setup_key_store();
    let roles = vec!["user:carol".to_string(), "reader".to_string(), "reader".to_string()];
    let credential = keys
        .issue("carol", "key3", "pw", 0, Some(roles.as_slice()))
        .await
        .unwrap();
    assert_eq!(
        credential.roles,
        vec!["user:carol", "user:carol", "reader", "reader"]
    );
}

#[tokio::test]
async fn test_issue_existing_key_conflicts() {
    let (keys, store) = setup_key_store();
    keys.issue("alice", "key1", "pw", 0, None).await.unwrap();

    let err = keys
        .issue("mallory", "key1", "other", 0, None)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    // The first owner is untouched
    let stored = store.get(&format!("{USER_PREFIX}key1")).await.unwrap();
    assert_eq!(stored.get("user_id"), Some(&json!("alice")));
}

#[tokio::test]
async fn test_issue_propagates_store_failure() {
    let (keys, store) = setup_key_store();
    store.fail_writes(true);
    let err = keys.issue("alice", "key1", "pw", 0, None).await.unwrap_err();
    assert!(err.is_store_error());
    assert!(matches!(
        err,
        dbauth::Error::Store(dbauth::backend::StoreError::Unavailable { .. })
    ));
    assert_eq!(store.inner().document_ids().await.len(), 1);
}

#[tokio::test]
async fn test_issued_key_can_be_reissued_after_revoke() {
    let (keys, _store) = setup_key_store();
    keys.issue("alice", "key1", "pw", 0, None).await.unwrap();
    assert!(keys.revoke("key1").await.unwrap().revoked());

    let again = keys.issue("alice", "key1", "pw2", 0, None).await.unwrap();
    assert!(again.rev.unwrap().starts_with("3-"));
}
