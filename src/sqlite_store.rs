//! SQLite-backed [`ContactStore`] implementation.
//!
//! Timestamps are stored as Unix seconds, like the rest of the schema.
//! Ids come from `INTEGER PRIMARY KEY AUTOINCREMENT`, so concurrent inserts
//! through the pool never collide.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use portfolio_core::models::{ContactSubmission, NewContact};
use portfolio_core::store::ContactStore;

/// SQLite implementation of the [`ContactStore`] trait.
pub struct SqliteContactStore {
    pool: SqlitePool,
}

impl SqliteContactStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn from_unix(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| anyhow!("invalid stored timestamp: {}", ts))
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn insert(&self, contact: &NewContact) -> Result<ContactSubmission> {
        let created_at = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO contacts (name, email, subject, message, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.subject)
        .bind(&contact.message)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(ContactSubmission {
            id: result.last_insert_rowid(),
            name: contact.name.clone(),
            email: contact.email.clone(),
            subject: contact.subject.clone(),
            message: contact.message.clone(),
            created_at: from_unix(created_at)?,
        })
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ContactSubmission>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, subject, message, created_at
            FROM contacts
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<ContactSubmission> {
                Ok(ContactSubmission {
                    id: row.get("id"),
                    name: row.get("name"),
                    email: row.get("email"),
                    subject: row.get("subject"),
                    message: row.get("message"),
                    created_at: from_unix(row.get("created_at"))?,
                })
            })
            .collect()
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
