//! Command implementations and shared utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use finsight_core::chat::{ChatBackend, ChatClient, ChatPipeline};
use finsight_core::db::Database;
use finsight_core::FormattedResponse;
use finsight_server::ServerConfig;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Resolve the database path: explicit flag, else the platform data directory
pub fn resolve_db_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let data_dir = dirs::data_dir()
        .context("Could not determine platform data directory; pass --db")?
        .join("finsight");
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    Ok(data_dir.join("finsight.db"))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add demo data:  finsight seed");
    println!("  2. Ask a question: finsight ask \"how much did I spend in March?\"");
    println!("  3. Start web UI:   finsight serve");

    Ok(())
}

pub fn cmd_seed(db_path: &Path, user: &str, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    db.seed_demo_data(user)
        .context("Failed to seed demo data (already seeded for this user?)")?;

    println!("✅ Seeded demo data for user '{}'", user);
    Ok(())
}

pub async fn cmd_ask(
    db_path: &Path,
    question: &str,
    user: &str,
    json: bool,
    no_encrypt: bool,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    let client = ChatClient::from_env().context(
        "Chat requires an AI backend. Set OLLAMA_HOST (and optionally OLLAMA_MODEL), \
         or AI_BACKEND=mock for a canned backend.",
    )?;

    tracing::debug!(model = client.model(), host = client.host(), "Asking assistant");

    let pipeline = ChatPipeline::new(db, client);
    let turn = pipeline.run_turn(user, question, &[]).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turn.response)?);
        return Ok(());
    }

    print_response(&turn.response);
    Ok(())
}

/// Render a formatted response for the terminal
fn print_response(response: &FormattedResponse) {
    match response {
        FormattedResponse::Text { content } => println!("{}", content),
        FormattedResponse::Table { table } => {
            println!("{}", table.columns.join(" | "));
            println!("{}", "-".repeat(table.columns.len() * 12));
            for row in &table.rows {
                let cells: Vec<&str> = table
                    .columns
                    .iter()
                    .map(|c| row.get(c).map(String::as_str).unwrap_or("-"))
                    .collect();
                println!("{}", cells.join(" | "));
            }
        }
        FormattedResponse::Chart { chart } => {
            // No terminal charting; show the shape and the underlying points
            println!(
                "[{:?} chart, {} data points]",
                chart.chart_type,
                chart.data.len()
            );
            for row in &chart.data {
                println!("  {}", row);
            }
        }
    }
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    allowed_origins: Vec<String>,
    no_encrypt: bool,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let config = ServerConfig { allowed_origins };

    finsight_server::serve(db, host, port, config).await
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    println!("📊 Database: {}", db_path.display());
    println!(
        "   Encryption: {}",
        if db.is_encrypted()? { "enabled" } else { "disabled" }
    );

    let conn = db.conn()?;
    for table in [
        "transactions",
        "investments",
        "goals",
        "assets",
        "bank_accounts",
        "bank_transactions",
        "chat_messages",
    ] {
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table),
            [],
            |row| row.get(0),
        )?;
        println!("   {:18} {}", table, count);
    }

    Ok(())
}
