//! Security document commands.

use dbauth::{Reconciled, SecurityDocument, SecurityReconciler};

use crate::backend::{open_store, save_store};
use crate::cli::{DatabaseArgs, EnsureRolesArgs, KeysArgs};
use crate::output::{OutputFormat, list, print_fields};

/// Run the `ensure-roles` command
pub async fn ensure_roles(
    args: &EnsureRolesArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.database.db).await?;
    let reconciler = SecurityReconciler::new(store.clone());

    let outcome = reconciler
        .ensure_roles(args.admin_roles.clone(), args.member_roles.clone())
        .await?;
    if outcome.changed() {
        save_store(&store, &args.database.db).await?;
    }
    report(&reconciler, outcome, format).await
}

/// Run the `authorize` command
pub async fn authorize(
    args: &KeysArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.database.db).await?;
    let reconciler = SecurityReconciler::new(store.clone());

    let outcome = reconciler.authorize(args.keys.clone()).await?;
    if outcome.changed() {
        save_store(&store, &args.database.db).await?;
    }
    report(&reconciler, outcome, format).await
}

/// Run the `deauthorize` command
pub async fn deauthorize(
    args: &KeysArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.database.db).await?;
    let reconciler = SecurityReconciler::new(store.clone());

    let outcome = reconciler.deauthorize(args.keys.clone()).await?;
    if outcome.changed() {
        save_store(&store, &args.database.db).await?;
    }
    report(&reconciler, outcome, format).await
}

/// Run the `show-security` command
pub async fn show(
    args: &DatabaseArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.db).await?;
    let doc = SecurityReconciler::new(store).load().await?;
    print_document(&doc, format)
}

async fn report(
    reconciler: &SecurityReconciler,
    outcome: Reconciled,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = match outcome {
        Reconciled::Updated(doc) => {
            tracing::info!("Security document updated");
            doc
        }
        Reconciled::Unchanged => {
            tracing::info!("Security document already up to date");
            reconciler.load().await?
        }
    };
    print_document(&doc, format)
}

fn print_document(
    doc: &SecurityDocument,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => print_fields(&[
            ("ADMIN NAMES", list(doc.admin_names())),
            ("ADMIN ROLES", list(doc.admin_roles())),
            ("MEMBER NAMES", list(doc.member_names())),
            ("MEMBER ROLES", list(doc.member_roles())),
        ]),
        OutputFormat::Json => println!("{}", serde_json::to_string(doc)?),
    }
    Ok(())
}
