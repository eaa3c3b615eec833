//! Upstream GitHub API client.
//!
//! The [`GitHubApi`] trait is the seam between the request handlers and the
//! network: the server holds an `Arc<dyn GitHubApi>`, production code plugs
//! in [`GitHubClient`], tests plug in a fake.
//!
//! # Error mapping
//!
//! | Upstream | Result |
//! |----------|--------|
//! | 2xx | parsed payload (or [`UpstreamError::Decode`]) |
//! | 404 | [`UpstreamError::NotFound`] |
//! | 403 | [`UpstreamError::RateLimited`] |
//! | other status | [`UpstreamError::Status`] |
//! | no response (DNS, TLS, timeout) | [`UpstreamError::Transport`] |
//!
//! No request is retried.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use portfolio_core::aggregate::UPSTREAM_PAGE_SIZE;
use portfolio_core::models::{ProfileSummary, RepositorySummary};
use portfolio_core::UpstreamError;

use crate::config::GitHubConfig;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Read-only access to the upstream profile and repository endpoints.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// `GET /users/{username}`
    async fn user(&self, username: &str) -> Result<ProfileSummary, UpstreamError>;

    /// `GET /users/{username}/repos?sort=updated&per_page=50&type=owner`
    async fn user_repos(&self, username: &str) -> Result<Vec<RepositorySummary>, UpstreamError>;
}

/// [`GitHubApi`] over HTTPS using `reqwest`.
///
/// Sends `User-Agent` and `Accept` on every request, plus
/// `Authorization: Bearer` when a token is configured. Every request is
/// bounded by `github.timeout_secs`.
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: Url,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build GitHub HTTP client")?;

        let api_base = Url::parse(&config.api_base)
            .with_context(|| format!("Invalid github.api_base: {}", config.api_base))?;
        if api_base.cannot_be_a_base() {
            anyhow::bail!("github.api_base cannot be used as a base URL: {}", api_base);
        }

        Ok(Self {
            http,
            api_base,
            token: config.token.clone(),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Appends path segments to the API base. Each segment is
    /// percent-encoded, so a username can never escape its path segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        username: &str,
    ) -> Result<T, UpstreamError> {
        let mut request = self.http.get(url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::from_status(status.as_u16(), username));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn user(&self, username: &str) -> Result<ProfileSummary, UpstreamError> {
        let url = self.endpoint(&["users", username]);
        self.get_json(url, username).await
    }

    async fn user_repos(&self, username: &str) -> Result<Vec<RepositorySummary>, UpstreamError> {
        let mut url = self.endpoint(&["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("sort", "updated")
            .append_pair("per_page", &UPSTREAM_PAGE_SIZE.to_string())
            .append_pair("type", "owner");
        self.get_json(url, username).await
    }
}
