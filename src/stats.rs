//! Database statistics and contact listing.
//!
//! `folio stats` gives a quick overview of the contact table (row count,
//! most recent submission, database size); `folio contacts` prints the
//! newest submissions.

use anyhow::Result;
use chrono::{DateTime, Utc};

use portfolio_core::store::ContactStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteContactStore;

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteContactStore::new(pool);

    let total = store.count().await?;
    let latest = store.recent(1).await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Portfolio API: Database Stats");
    println!("==============================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Contacts:    {}", total);
    println!(
        "  Latest:      {}",
        match latest.first() {
            Some(c) => format_relative(c.created_at, Utc::now()),
            None => "never".to_string(),
        }
    );
    println!();

    store.pool().close().await;
    Ok(())
}

/// Print the newest `limit` contact submissions.
pub async fn run_contacts(config: &Config, limit: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteContactStore::new(pool);

    let rows = store.recent(limit).await?;
    if rows.is_empty() {
        println!("No contact submissions.");
    } else {
        println!(
            "  {:>5}   {:<16} {:<28} {:<24} {}",
            "ID", "RECEIVED", "EMAIL", "NAME", "SUBJECT"
        );
        println!("  {}", "-".repeat(92));
        for c in &rows {
            println!(
                "  {:>5}   {:<16} {:<28} {:<24} {}",
                c.id,
                c.created_at.format("%Y-%m-%d %H:%M"),
                c.email,
                c.name,
                c.subject.as_deref().unwrap_or("-")
            );
        }
    }

    store.pool().close().await;
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Format a timestamp relative to `now` (e.g. "3 hours ago").
fn format_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = (now - ts).num_seconds();

    if delta < 0 {
        return ts.format("%Y-%m-%d %H:%M").to_string();
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        ts.format("%Y-%m-%d %H:%M").to_string()
    }
}
