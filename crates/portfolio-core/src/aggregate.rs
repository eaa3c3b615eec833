//! Repository aggregation.
//!
//! Turns the raw upstream repository list into the ranked list served by
//! `GET /api/repos/{username}`:
//!
//! 1. Drop forks, archived repositories and entries with a negative star count.
//! 2. Attach [`DerivedMetrics`] to every survivor.
//! 3. Sort by stars (descending), ties by `updated_at` (most recent first).
//! 4. Keep the first [`MAX_REPOSITORIES`].
//! 5. Compute [`AggregateStats`] over what is left.
//!
//! Every function takes `now` explicitly so activity classification is
//! deterministic under test.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::{
    ActivityLevel, AggregateStats, DerivedMetrics, RankedRepository, ReposResponse,
    RepositorySummary,
};

/// Number of repositories requested from the upstream in one page.
pub const UPSTREAM_PAGE_SIZE: u32 = 50;

/// Maximum number of repositories returned to the caller.
pub const MAX_REPOSITORIES: usize = 20;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Classifies a repository by days elapsed since its last update.
///
/// Boundaries are inclusive: ≤7 days is very active, ≤30 active, ≤90
/// moderate, anything older (or an unknown timestamp) inactive.
pub fn activity_level(updated_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ActivityLevel {
    let Some(updated_at) = updated_at else {
        return ActivityLevel::Inactive;
    };
    let days = (now - updated_at).num_seconds() as f64 / SECONDS_PER_DAY;

    if days <= 7.0 {
        ActivityLevel::VeryActive
    } else if days <= 30.0 {
        ActivityLevel::Active
    } else if days <= 90.0 {
        ActivityLevel::Moderate
    } else {
        ActivityLevel::Inactive
    }
}

/// `3 × stars + 2 × forks + watchers`, saturating at `i64::MAX`.
pub fn popularity_score(repo: &RepositorySummary) -> i64 {
    repo.stargazers_count
        .saturating_mul(3)
        .saturating_add(repo.forks_count.saturating_mul(2))
        .saturating_add(repo.watchers_count)
}

pub fn derive_metrics(repo: &RepositorySummary, now: DateTime<Utc>) -> DerivedMetrics {
    DerivedMetrics {
        popularity_score: popularity_score(repo),
        activity_level: activity_level(repo.updated_at, now),
        tech_stack: repo.topics.clone(),
        last_commit: repo.updated_at,
    }
}

/// Whether a repository belongs in the showcase list.
fn is_showcased(repo: &RepositorySummary) -> bool {
    !repo.fork && !repo.archived && repo.stargazers_count >= 0
}

/// Stars descending, then most recently updated first. A missing timestamp
/// sorts after any known one.
fn rank_order(a: &RepositorySummary, b: &RepositorySummary) -> Ordering {
    b.stargazers_count
        .cmp(&a.stargazers_count)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

/// Runs the full filter → derive → sort → truncate → stats pipeline.
pub fn aggregate_repositories(
    repos: Vec<RepositorySummary>,
    now: DateTime<Utc>,
) -> ReposResponse {
    let mut kept: Vec<RepositorySummary> = repos.into_iter().filter(is_showcased).collect();
    kept.sort_by(rank_order);
    kept.truncate(MAX_REPOSITORIES);

    let repositories: Vec<RankedRepository> = kept
        .into_iter()
        .map(|repo| {
            let computed_metrics = derive_metrics(&repo, now);
            RankedRepository {
                repo,
                computed_metrics,
            }
        })
        .collect();

    let stats = compute_stats(&repositories, now);

    ReposResponse {
        repositories,
        stats,
    }
}

fn saturating_total(counts: impl Iterator<Item = i64>) -> i64 {
    counts.fold(0i64, i64::saturating_add)
}

/// Star/fork totals and distinct languages over an already-ranked list.
pub fn compute_stats(repositories: &[RankedRepository], now: DateTime<Utc>) -> AggregateStats {
    let mut languages: Vec<String> = Vec::new();
    for lang in repositories.iter().filter_map(|r| r.repo.language.as_ref()) {
        if !lang.is_empty() && !languages.contains(lang) {
            languages.push(lang.clone());
        }
    }

    AggregateStats {
        total_repos: repositories.len(),
        total_stars: saturating_total(repositories.iter().map(|r| r.repo.stargazers_count)),
        total_forks: saturating_total(repositories.iter().map(|r| r.repo.forks_count)),
        languages,
        last_updated: now,
    }
}
