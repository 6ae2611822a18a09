//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use clap::Parser;
use finsight_core::db::Database;

use crate::cli::{Cli, Commands};
use crate::commands;

fn setup_test_db() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    (dir, path)
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_ask_defaults() {
    let cli = Cli::parse_from(["finsight", "ask", "how much did I spend?"]);
    match cli.command {
        Commands::Ask {
            question,
            user,
            json,
        } => {
            assert_eq!(question, "how much did I spend?");
            assert_eq!(user, "local");
            assert!(!json);
        }
        _ => panic!("expected ask command"),
    }
}

#[test]
fn test_parse_serve_flags() {
    let cli = Cli::parse_from([
        "finsight",
        "serve",
        "--port",
        "8080",
        "--allow-origin",
        "http://localhost:5173",
    ]);
    match cli.command {
        Commands::Serve {
            port,
            host,
            allow_origin,
        } => {
            assert_eq!(port, 8080);
            assert_eq!(host, "127.0.0.1");
            assert_eq!(allow_origin, vec!["http://localhost:5173"]);
        }
        _ => panic!("expected serve command"),
    }
}

#[test]
fn test_global_flags_apply_after_subcommand() {
    let cli = Cli::parse_from(["finsight", "status", "--no-encrypt", "--verbose"]);
    assert!(cli.no_encrypt);
    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::Status));
}

// ========== Command Tests ==========

#[test]
fn test_cmd_init_and_status() {
    let (_dir, path) = setup_test_db();
    commands::cmd_init(&path, true).unwrap();
    commands::cmd_status(&path, true).unwrap();
}

#[test]
fn test_cmd_seed_populates_tables() {
    let (_dir, path) = setup_test_db();
    commands::cmd_seed(&path, "local", true).unwrap();

    let db = Database::new_unencrypted(path.to_str().unwrap()).unwrap();
    let conn = db.conn().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
        .unwrap();
    assert!(count > 0);
}

#[test]
fn test_cmd_seed_twice_fails_cleanly() {
    let (_dir, path) = setup_test_db();
    commands::cmd_seed(&path, "local", true).unwrap();
    assert!(commands::cmd_seed(&path, "local", true).is_err());
}

#[tokio::test]
async fn test_cmd_ask_with_mock_backend() {
    let (_dir, path) = setup_test_db();
    commands::cmd_seed(&path, "local", true).unwrap();

    // The mock backend echoes, so the turn completes as plain text
    std::env::set_var("AI_BACKEND", "mock");
    let result = commands::cmd_ask(&path, "hello", "local", false, true).await;
    std::env::remove_var("AI_BACKEND");

    result.unwrap();
}
