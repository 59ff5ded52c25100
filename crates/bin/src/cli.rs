//! CLI argument definitions for the dbauth binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manage API keys and database security documents
#[derive(Parser, Debug)]
#[command(name = "dbauth")]
#[command(about = "Issue API keys and reconcile database security documents")]
#[command(version)]
pub struct Cli {
    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issue a new API key for a user
    Issue(IssueArgs),
    /// Revoke one or more API keys
    Revoke(RevokeArgs),
    /// Add admin and member roles to a database's security document
    EnsureRoles(EnsureRolesArgs),
    /// Add API keys to a database's member names
    Authorize(KeysArgs),
    /// Remove API keys from a database's member names
    Deauthorize(KeysArgs),
    /// Print a database's security document
    ShowSecurity(DatabaseArgs),
}

/// Location of the auth database holding credential documents
#[derive(clap::Args, Debug)]
pub struct AuthDbArgs {
    /// JSON file backing the auth database
    #[arg(long, default_value = "auth.json", env = "DBAUTH_AUTH_DB")]
    pub auth_db: PathBuf,
}

/// Location of the database whose security document is managed
#[derive(clap::Args, Debug)]
pub struct DatabaseArgs {
    /// JSON file backing the database
    #[arg(long, default_value = "db.json", env = "DBAUTH_DB")]
    pub db: PathBuf,
}

/// Arguments for the issue command
#[derive(clap::Args, Debug)]
pub struct IssueArgs {
    #[command(flatten)]
    pub auth: AuthDbArgs,

    /// Owning username
    pub username: String,

    /// Key id to issue
    pub key: String,

    /// Key secret
    #[arg(long, env = "DBAUTH_KEY_PASSWORD")]
    pub password: String,

    /// Expiry as milliseconds since the Unix epoch (overrides --ttl-days)
    #[arg(long)]
    pub expires: Option<i64>,

    /// Lifetime of the key in days, used when --expires is not given
    #[arg(long, default_value_t = 30, env = "DBAUTH_KEY_TTL_DAYS")]
    pub ttl_days: i64,

    /// Extra role granted to the key (repeatable)
    #[arg(short, long = "role")]
    pub roles: Vec<String>,
}

/// Arguments for the revoke command
#[derive(clap::Args, Debug)]
pub struct RevokeArgs {
    #[command(flatten)]
    pub auth: AuthDbArgs,

    /// Key ids to revoke
    #[arg(required = true)]
    pub keys: Vec<String>,
}

/// Arguments for the ensure-roles command
#[derive(clap::Args, Debug)]
pub struct EnsureRolesArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Admin role to ensure (repeatable)
    #[arg(long = "admin-role")]
    pub admin_roles: Vec<String>,

    /// Member role to ensure (repeatable)
    #[arg(long = "member-role")]
    pub member_roles: Vec<String>,
}

/// Arguments for the authorize and deauthorize commands
#[derive(clap::Args, Debug)]
pub struct KeysArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Key ids
    #[arg(required = true)]
    pub keys: Vec<String>,
}
