//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Finsight - Ask your finances questions
#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Self-hosted personal finance assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to finsight.db in the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set FINSIGHT_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Insert a demo dataset so the assistant has data to answer about
    Seed {
        /// User id to seed data for
        #[arg(long, default_value = "local")]
        user: String,
    },

    /// Ask the assistant a one-shot question from the terminal
    Ask {
        /// The question to ask
        question: String,

        /// User id to query as
        #[arg(long, default_value = "local")]
        user: String,

        /// Print the raw JSON payload instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Allowed CORS origin (repeatable)
        #[arg(long)]
        allow_origin: Vec<String>,
    },

    /// Show database status (encryption, size, etc.)
    Status,
}
