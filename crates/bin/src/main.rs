use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod output;

mod commands {
    pub mod keys;
    pub mod security;
}

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("dbauth=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.json);

    match &cli.command {
        Commands::Issue(args) => commands::keys::issue(args, format).await,
        Commands::Revoke(args) => commands::keys::revoke(args, format).await,
        Commands::EnsureRoles(args) => commands::security::ensure_roles(args, format).await,
        Commands::Authorize(args) => commands::security::authorize(args, format).await,
        Commands::Deauthorize(args) => commands::security::deauthorize(args, format).await,
        Commands::ShowSecurity(args) => commands::security::show(args, format).await,
    }
}
