//! Data types shared by the aggregator, the profile fetcher and the contact
//! handler.
//!
//! Upstream payloads are described by explicit schemas. Unknown fields are
//! ignored and missing or `null` fields fall back to their default, so a
//! sparse upstream object never fails to parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes `null` as the type's default instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============ Upstream schemas ============

/// One entry of the upstream repository list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySummary {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub html_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stargazers_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub forks_count: i64,
    pub language: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub homepage: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub fork: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub archived: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub watchers_count: i64,
}

/// The upstream user profile object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub public_repos: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub followers: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub following: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub avatar_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub html_url: String,
    pub created_at: Option<DateTime<Utc>>,
}

// ============ Derived data ============

/// Coarse recency classification of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityLevel {
    VeryActive,
    Active,
    Moderate,
    Inactive,
}

/// Metrics computed per repository at response time. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub popularity_score: i64,
    pub activity_level: ActivityLevel,
    pub tech_stack: Vec<String>,
    pub last_commit: Option<DateTime<Utc>>,
}

/// A repository as returned to the caller: upstream fields plus
/// `computed_metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRepository {
    #[serde(flatten)]
    pub repo: RepositorySummary,
    pub computed_metrics: DerivedMetrics,
}

/// Totals over the returned (filtered and truncated) repository list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_repos: usize,
    pub total_stars: i64,
    pub total_forks: i64,
    /// Distinct non-null languages in first-seen order.
    pub languages: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// Response body of the repository endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReposResponse {
    pub repositories: Vec<RankedRepository>,
    pub stats: AggregateStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub activity_score: i64,
    pub last_updated: DateTime<Utc>,
}

/// Response body of the profile endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: ProfileSummary,
    pub computed_stats: ProfileStats,
}

// ============ Contact ============

/// Raw contact form body. Every field is optional here so that an absent
/// field is reported as a validation failure rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A validated contact submission, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

/// A stored contact submission. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
