//! Storage abstraction for contact submissions.
//!
//! The [`ContactStore`] trait is append-only: there is an insert and there
//! are reads, but no update or delete. Every insert is independent, so
//! implementations only need to keep concurrent inserts from corrupting
//! each other.
//!
//! Implementations must be `Send + Sync` to be shared across request tasks.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ContactSubmission, NewContact};

/// Append-only storage for contact submissions.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert`](ContactStore::insert) | Persist a validated submission and assign its id |
/// | [`recent`](ContactStore::recent) | Newest submissions first |
/// | [`count`](ContactStore::count) | Total number of stored submissions |
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Persist a submission. Returns the stored row with its generated id
    /// and creation timestamp.
    async fn insert(&self, contact: &NewContact) -> Result<ContactSubmission>;

    /// Up to `limit` submissions, newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<ContactSubmission>>;

    async fn count(&self) -> Result<i64>;
}
