//! HTTP server.
//!
//! Exposes the GitHub proxy and the contact form as a JSON API for the
//! portfolio front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/profile/{username}` | Upstream profile plus `computed_stats` |
//! | `GET`  | `/api/repos/{username}` | Ranked repositories plus aggregate `stats` |
//! | `GET`  | `/api/github/user/{username}` | Alias of `/api/profile/{username}` |
//! | `GET`  | `/api/github/repos/{username}` | Alias of `/api/repos/{username}` |
//! | `POST` | `/api/contact` | Validate and store a contact submission |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Every endpoint also answers `OPTIONS` with `200` and rejects any other
//! method with `405`.
//!
//! # Error Contract
//!
//! ```json
//! { "error": "RateLimited", "message": "GitHub API rate limit exceeded. ..." }
//! ```
//!
//! | Code | Status |
//! |------|--------|
//! | `ValidationError` | 400 |
//! | `NotFound` | 404 |
//! | `MethodNotAllowed` | 405 |
//! | `RateLimited` | 429 |
//! | `UpstreamError` | 500 (carries `status` when the upstream answered) |
//! | `InternalError` | 500 |
//!
//! # CORS
//!
//! Any origin; methods `GET, POST, OPTIONS`; headers `Content-Type,
//! Authorization`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use portfolio_core::models::{ContactForm, ProfileResponse, ReposResponse};
use portfolio_core::{UpstreamError, ValidationError};

use crate::config::Config;
use crate::contact::{ContactService, SubmitError};
use crate::github::{GitHubApi, GitHubClient};
use crate::mailer::create_mailer;
use crate::proxy::{fetch_profile, fetch_repositories, parse_username};
use crate::sqlite_store::SqliteContactStore;
use crate::{db, migrate};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    github: Arc<dyn GitHubApi>,
    contacts: Arc<ContactService>,
}

impl AppState {
    pub fn new(config: Config, github: Arc<dyn GitHubApi>, contacts: ContactService) -> Self {
        Self {
            config: Arc::new(config),
            github,
            contacts: Arc::new(contacts),
        }
    }
}

/// Starts the HTTP server.
///
/// Opens (and migrates) the SQLite database, builds the GitHub client and
/// the optional mailer from `config`, binds to `[server].bind` and serves
/// until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;

    let github = GitHubClient::new(&config.github)?;
    if !github.has_token() {
        tracing::info!("no GitHub token configured; using the anonymous rate limit");
    }

    let mailer = create_mailer(&config.mail)?;
    if !config.mail.is_enabled() {
        tracing::info!("mail disabled; contact submissions are stored without notification");
    }
    let contacts = ContactService::new(
        Arc::new(SqliteContactStore::new(pool)),
        mailer,
        config.mail.clone(),
    );

    let state = AppState::new(config.clone(), Arc::new(github), contacts);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "portfolio API listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the full route table with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/api/profile/{username}", endpoint(get(handle_profile)))
        .route("/api/repos/{username}", endpoint(get(handle_repos)))
        .route("/api/github/user/{username}", endpoint(get(handle_profile)))
        .route("/api/github/repos/{username}", endpoint(get(handle_repos)))
        .route("/api/contact", endpoint(post(handle_contact)))
        .route("/health", endpoint(get(handle_health)))
        .fallback(handle_unknown_route)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Adds the `OPTIONS` handler and the JSON `405` fallback to a route.
fn endpoint(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.options(handle_options).fallback(handle_method_not_allowed)
}

// ============ Error response ============

/// JSON error body: a machine-readable code and a human-readable message.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
    upstream_status: Option<u16>,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            upstream_status: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code,
            message: self.message,
            status: self.upstream_status,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::new(StatusCode::BAD_REQUEST, "ValidationError", err.to_string())
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::NotFound { .. } => {
                AppError::new(StatusCode::NOT_FOUND, "NotFound", err.to_string())
            }
            UpstreamError::RateLimited => {
                AppError::new(StatusCode::TOO_MANY_REQUESTS, "RateLimited", err.to_string())
            }
            UpstreamError::Status { .. }
            | UpstreamError::Transport(_)
            | UpstreamError::Decode(_) => {
                let mut e = AppError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UpstreamError",
                    err.to_string(),
                );
                e.upstream_status = err.status();
                e
            }
        }
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(v) => v.into(),
            SubmitError::Store(e) => {
                tracing::error!(error = %e, "contact store failure");
                AppError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalError",
                    "Failed to submit contact form. Please try again later",
                )
            }
        }
    }
}

fn cache_control(value: String) -> [(header::HeaderName, HeaderValue); 1] {
    let value = HeaderValue::try_from(value).unwrap_or(HeaderValue::from_static("no-store"));
    [(header::CACHE_CONTROL, value)]
}

// ============ GET /api/profile/{username} ============

async fn handle_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let username = parse_username(&username)?;
    let profile: ProfileResponse = fetch_profile(state.github.as_ref(), username).await?;
    Ok((
        cache_control(state.config.cache.profile_header()),
        Json(profile),
    ))
}

// ============ GET /api/repos/{username} ============

async fn handle_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let username = parse_username(&username)?;
    let repos: ReposResponse = fetch_repositories(state.github.as_ref(), username).await?;
    Ok((cache_control(state.config.cache.repos_header()), Json(repos)))
}

// ============ POST /api/contact ============

#[derive(Serialize)]
struct ContactResponse {
    success: bool,
    message: &'static str,
    id: i64,
}

/// Malformed JSON is reported as a `ValidationError`, not as Axum's
/// extractor rejection.
async fn handle_contact(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ContactResponse>, AppError> {
    let form: ContactForm = serde_json::from_slice(&body)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;

    let saved = state.contacts.submit(form).await?;

    Ok(Json(ContactResponse {
        success: true,
        message: "Message sent successfully! I'll get back to you soon.",
        id: saved.id,
    }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ OPTIONS / 405 / 404 ============

async fn handle_options() -> StatusCode {
    StatusCode::OK
}

async fn handle_method_not_allowed(method: Method) -> AppError {
    AppError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        "MethodNotAllowed",
        format!("Method {} not allowed", method),
    )
}

async fn handle_unknown_route() -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "NotFound", "Not found")
}
