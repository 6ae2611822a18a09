//! Finsight CLI - Personal finance assistant
//!
//! Usage:
//!   finsight init                 Initialize database
//!   finsight seed                 Insert demo data
//!   finsight ask "question"       One-shot chat query
//!   finsight serve --port 3000    Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = commands::resolve_db_path(cli.db.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path, cli.no_encrypt),
        Commands::Seed { user } => commands::cmd_seed(&db_path, &user, cli.no_encrypt),
        Commands::Ask {
            question,
            user,
            json,
        } => commands::cmd_ask(&db_path, &question, &user, json, cli.no_encrypt).await,
        Commands::Serve {
            port,
            host,
            allow_origin,
        } => commands::cmd_serve(&db_path, &host, port, allow_origin, cli.no_encrypt).await,
        Commands::Status => commands::cmd_status(&db_path, cli.no_encrypt),
    }
}
