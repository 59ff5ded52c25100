//! API key commands.

use chrono::{DateTime, TimeDelta, Utc};
use dbauth::KeyStore;

use crate::backend::{open_store, save_store};
use crate::cli::{IssueArgs, RevokeArgs};
use crate::output::{OutputFormat, list, print_fields};

/// Run the `issue` command
pub async fn issue(args: &IssueArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.auth.auth_db).await?;
    let keys = KeyStore::new(store.clone());

    let expires = match args.expires {
        Some(expires) => expires,
        None => expiry_after(Utc::now(), args.ttl_days)?,
    };

    let credential = keys
        .issue(
            &args.username,
            &args.key,
            &args.password,
            expires,
            Some(args.roles.as_slice()),
        )
        .await?;
    save_store(&store, &args.auth.auth_db).await?;
    tracing::info!(key = %credential.id, user = %credential.user_id, "Issued API key");

    match format {
        OutputFormat::Human => print_fields(&[
            ("KEY", credential.id.clone()),
            ("USER", credential.user_id.clone()),
            ("EXPIRES", credential.expires.to_string()),
            ("ROLES", list(&credential.roles)),
        ]),
        OutputFormat::Json => {
            // The secret is not echoed back
            let mut value = serde_json::to_value(&credential)?;
            if let Some(object) = value.as_object_mut() {
                object.remove("password");
            }
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}

/// Expiry timestamp in milliseconds, `ttl_days` after `now`.
fn expiry_after(now: DateTime<Utc>, ttl_days: i64) -> Result<i64, String> {
    TimeDelta::try_days(ttl_days)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .map(|expires| expires.timestamp_millis())
        .ok_or_else(|| format!("--ttl-days {ttl_days} is out of range"))
}

/// Run the `revoke` command
pub async fn revoke(
    args: &RevokeArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.auth.auth_db).await?;
    let keys = KeyStore::new(store.clone());

    let revocation = keys.revoke(args.keys.clone()).await?;
    if revocation.revoked() {
        save_store(&store, &args.auth.auth_db).await?;
    }

    let failures: Vec<String> = revocation
        .failures()
        .map(|result| format!("{} ({})", result.id, result.error.as_deref().unwrap_or("error")))
        .collect();
    for failure in &failures {
        tracing::warn!("Failed to revoke {failure}");
    }

    match format {
        OutputFormat::Human => {
            if revocation.revoked() {
                println!(
                    "Revoked {} of {} keys.",
                    revocation.results().len() - failures.len(),
                    args.keys.len()
                );
            } else {
                println!("No keys to revoke.");
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&serde_json::json!({
                    "revoked": revocation.revoked(),
                    "results": revocation.results(),
                }))?
            );
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("failed to revoke: {}", failures.join(", ")).into())
    }
}
