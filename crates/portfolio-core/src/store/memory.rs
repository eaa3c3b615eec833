//! In-memory [`ContactStore`] for tests and ephemeral deployments.
//!
//! Rows live in a `Vec` behind `std::sync::RwLock`; ids come from the
//! vector length under the write lock, so they are unique and increasing.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::models::{ContactSubmission, NewContact};

use super::ContactStore;

#[derive(Debug, Default)]
pub struct InMemoryContactStore {
    rows: RwLock<Vec<ContactSubmission>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn insert(&self, contact: &NewContact) -> Result<ContactSubmission> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| anyhow!("contact store lock poisoned"))?;
        let row = ContactSubmission {
            id: rows.len() as i64 + 1,
            name: contact.name.clone(),
            email: contact.email.clone(),
            subject: contact.subject.clone(),
            message: contact.message.clone(),
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ContactSubmission>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| anyhow!("contact store lock poisoned"))?;
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<i64> {
        let rows = self
            .rows
            .read()
            .map_err(|_| anyhow!("contact store lock poisoned"))?;
        Ok(rows.len() as i64)
    }
}
