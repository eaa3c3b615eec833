//! Typed failures surfaced to HTTP callers.
//!
//! Everything else in the stack uses `anyhow`; these two enums exist
//! because the server needs to map each failure onto a status code and a
//! machine-readable error code.

use thiserror::Error;

/// Failure talking to the upstream GitHub-compatible API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered 404: the user does not exist.
    #[error("User {username} does not exist")]
    NotFound { username: String },

    /// Upstream answered 403: the request quota is exhausted.
    #[error("GitHub API rate limit exceeded. Please try again later or provide a GitHub token")]
    RateLimited,

    /// Upstream answered with any other non-success status.
    #[error("GitHub API error: {status}")]
    Status { status: u16 },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("GitHub API request failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON shape.
    #[error("GitHub API returned an unexpected payload: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Maps a non-success upstream status code onto a failure kind.
    pub fn from_status(status: u16, username: &str) -> Self {
        match status {
            404 => UpstreamError::NotFound {
                username: username.to_string(),
            },
            403 => UpstreamError::RateLimited,
            other => UpstreamError::Status { status: other },
        }
    }

    /// The upstream status code, when the upstream actually answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::NotFound { .. } => Some(404),
            UpstreamError::RateLimited => Some(403),
            UpstreamError::Status { status } => Some(*status),
            UpstreamError::Transport(_) | UpstreamError::Decode(_) => None,
        }
    }
}

/// A request rejected before any upstream call or store write: a bad
/// contact submission, a blank username, or an unparseable body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name, email, and message are required")]
    MissingFields,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Username is required")]
    MissingUsername,

    #[error("Invalid request body: {0}")]
    MalformedBody(String),
}
