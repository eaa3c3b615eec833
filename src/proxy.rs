//! Profile and repository lookups: upstream call plus enrichment.
//!
//! Shared by the HTTP handlers and the `folio profile` / `folio repos`
//! commands. The rate-limit policy lives here too: an upstream 403 is
//! always reported as [`UpstreamError::RateLimited`], never replaced with
//! placeholder data.

use chrono::Utc;

use portfolio_core::aggregate::aggregate_repositories;
use portfolio_core::models::{ProfileResponse, ReposResponse};
use portfolio_core::profile::enrich_profile;
use portfolio_core::{UpstreamError, ValidationError};

use crate::github::GitHubApi;

/// Trims the path parameter and rejects an empty one. No charset
/// restriction is applied; the upstream decides what exists.
pub fn parse_username(raw: &str) -> Result<&str, ValidationError> {
    let username = raw.trim();
    if username.is_empty() {
        Err(ValidationError::MissingUsername)
    } else {
        Ok(username)
    }
}

pub async fn fetch_profile(
    api: &dyn GitHubApi,
    username: &str,
) -> Result<ProfileResponse, UpstreamError> {
    let profile = api
        .user(username)
        .await
        .inspect_err(|e| log_failure("profile", username, e))?;
    Ok(enrich_profile(profile, Utc::now()))
}

pub async fn fetch_repositories(
    api: &dyn GitHubApi,
    username: &str,
) -> Result<ReposResponse, UpstreamError> {
    let repos = api
        .user_repos(username)
        .await
        .inspect_err(|e| log_failure("repos", username, e))?;
    let fetched = repos.len();
    let response = aggregate_repositories(repos, Utc::now());
    tracing::debug!(
        username,
        fetched,
        returned = response.repositories.len(),
        "aggregated repositories"
    );
    Ok(response)
}

fn log_failure(what: &str, username: &str, err: &UpstreamError) {
    match err {
        UpstreamError::NotFound { .. } => {
            tracing::info!(what, username, "upstream user not found")
        }
        UpstreamError::RateLimited => {
            tracing::warn!(what, username, "upstream rate limit exceeded")
        }
        other => tracing::error!(what, username, error = %other, "upstream request failed"),
    }
}
