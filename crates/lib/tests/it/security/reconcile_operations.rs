//! ensure_roles, authorize and deauthorize against a stored security document

use std::collections::HashMap;

use dbauth::Reconciled;
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn test_ensure_roles_on_blank_document() {
    let (reconciler, store) = setup_reconciler(json!({})).await;

    let outcome = reconciler
        .ensure_roles(["admin1"], Vec::<String>::new())
        .await
        .unwrap();
    assert!(outcome.changed());
    assert_eq!(store.write_count(), 1);
    assert_eq!(
        security_json(&store).await,
        json!({
            "admins": {"names": [], "roles": ["admin1"]},
            "members": {"names": [], "roles": []}
        })
    );
}

#[tokio::test]
async fn test_ensure_roles_is_idempotent() {
    let (reconciler, store) = setup_reconciler(json!({})).await;

    let first = reconciler
        .ensure_roles(["admin1", "admin2"], ["member1"])
        .await
        .unwrap();
    assert!(first.changed());
    let after_first = security_json(&store).await;

    let second = reconciler
        .ensure_roles(["admin1", "admin2"], ["member1"])
        .await
        .unwrap();
    assert_eq!(second, Reconciled::Unchanged);
    assert_eq!(security_json(&store).await, after_first);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_ensure_roles_never_removes_existing_roles() {
    let (reconciler, store) = setup_reconciler(json!({
        "admins": {"names": ["root"], "roles": ["ops"]},
        "members": {"names": ["key0"], "roles": ["reader"]}
    }))
    .await;

    reconciler
        .ensure_roles(["admin1"], ["writer"])
        .await
        .unwrap();
    assert_eq!(
        security_json(&store).await,
        json!({
            "admins": {"names": ["root"], "roles": ["ops", "admin1"]},
            "members": {"names": ["key0"], "roles": ["reader", "writer"]}
        })
    );
}

#[tokio::test]
async fn test_ensure_roles_with_missing_member_roles_keeps_admin_roles() {
    let (reconciler, store) = setup_reconciler(json!({
        "admins": {"roles": ["ops"]},
        "members": {"names": ["key0"]}
    }))
    .await;

    let outcome = reconciler
        .ensure_roles(Vec::<String>::new(), ["reader"])
        .await
        .unwrap();
    assert!(outcome.changed());
    let doc = outcome.document().unwrap();
    assert_eq!(doc.admin_roles(), ["ops"]);
    assert_eq!(doc.member_roles(), ["reader"]);
    assert_eq!(doc.member_names(), ["key0"]);
    assert_eq!(security_json(&store).await["admins"]["roles"], json!(["ops"]));
}

#[tokio::test]
async fn test_updated_outcome_carries_new_revision() {
    let (reconciler, store) = setup_reconciler(json!({})).await;
    let before = reconciler.load().await.unwrap().rev.unwrap();

    let outcome = reconciler.authorize("key1").await.unwrap();
    let written = outcome.document().unwrap();
    assert_ne!(written.rev.as_deref(), Some(before.as_str()));
    assert_eq!(written.rev, reconciler.load().await.unwrap().rev);
    assert_eq!(written.id.as_deref(), Some("_security"));
    assert_eq!(store.puts().len(), 1);
    // The write was guarded by the revision that was read
    assert_eq!(store.puts()[0].rev(), Some(before.as_str()));
}

#[tokio::test]
async fn test_authorize_adds_each_key_once() {
    let (reconciler, store) = setup_reconciler(json!({})).await;

    for _ in 0..3 {
        reconciler.authorize(["k1", "k2", "k1"]).await.unwrap();
    }
    reconciler.authorize("k3").await.unwrap();

    let security = security_json(&store).await;
    assert_eq!(security["members"]["names"], json!(["k1", "k2", "k3"]));
    // One write for the first call and one for k3
    assert_eq!(store.write_count(), 2);
}

#[tokio::test]
async fn test_authorize_accepts_map_keys() {
    let (reconciler, store) = setup_reconciler(json!({})).await;
    let mut keys = HashMap::new();
    keys.insert("k1".to_string(), json!({"scope": "ignored"}));

    let outcome = reconciler.authorize(&keys).await.unwrap();
    assert!(outcome.changed());
    assert_eq!(security_json(&store).await["members"]["names"], json!(["k1"]));
}

#[tokio::test]
async fn test_deauthorize_removes_names() {
    let (reconciler, store) = setup_reconciler(json!({
        "members": {"names": ["k1", "k2"], "roles": []}
    }))
    .await;

    let first = reconciler.deauthorize(["k1"]).await.unwrap();
    assert!(first.changed());
    assert_eq!(security_json(&store).await["members"]["names"], json!(["k2"]));

    let second = reconciler.deauthorize(["k1"]).await.unwrap();
    assert!(!second.changed());
    assert_eq!(security_json(&store).await["members"]["names"], json!(["k2"]));
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_deauthorize_without_member_names_writes_nothing() {
    let (reconciler, store) = setup_reconciler(json!({"members": {"roles": ["r"]}})).await;
    let outcome = reconciler.deauthorize("k1").await.unwrap();
    assert_eq!(outcome, Reconciled::Unchanged);
    assert_eq!(store.write_count(), 0);
    assert_eq!(security_json(&store).await, json!({"members": {"roles": ["r"]}}));
}

#[tokio::test]
async fn test_unrelated_fields_are_preserved() {
    let (reconciler, store) = setup_reconciler(json!({
        "couchdb_auth_only": true,
        "admins": {"names": [], "roles": [], "comment": "ops team"}
    }))
    .await;

    reconciler.authorize("k1").await.unwrap();
    let security = security_json(&store).await;
    assert_eq!(security["couchdb_auth_only"], json!(true));
    assert_eq!(security["admins"]["comment"], json!("ops team"));
}

#[tokio::test]
async fn test_missing_security_document_is_not_found() {
    let store = std::sync::Arc::new(RecordingStore::new(dbauth::InMemory::empty()));
    let reconciler = dbauth::SecurityReconciler::new(store.clone());
    let err = reconciler.authorize("k1").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_write_failure_is_propagated_and_state_untouched() {
    let (reconciler, store) = setup_reconciler(json!({"members": {"names": ["k0"]}})).await;
    store.fail_writes(true);

    let err = reconciler.authorize("k1").await.unwrap_err();
    assert!(err.is_store_error());
    assert!(!err.is_conflict());
    assert_eq!(security_json(&store).await, json!({"members": {"names": ["k0"]}}));
}
