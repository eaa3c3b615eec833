//! Database schema migrations. Every statement is idempotent, so running
//! `folio init` (or starting the server) repeatedly is safe.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Apply the schema to an already-open pool.
pub async fn migrate_pool(pool: &SqlitePool) -> Result<()> {
    // Append-only: rows are never updated or deleted.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            subject TEXT,
            message TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_contacts_created_at ON contacts(created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
