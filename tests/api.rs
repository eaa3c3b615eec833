use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;

use portfolio_api::config::{Config, MailConfig};
use portfolio_api::contact::ContactService;
use portfolio_api::github::GitHubApi;
use portfolio_api::mailer::{Mailer, OutgoingEmail};
use portfolio_api::models::{ProfileSummary, RepositorySummary};
use portfolio_api::server::{router, AppState};
use portfolio_api::store::memory::InMemoryContactStore;
use portfolio_api::store::ContactStore;
use portfolio_core::UpstreamError;

/// Upstream stand-in keyed on username.
struct FakeGitHub {
    repos: Vec<RepositorySummary>,
}

fn upstream_failure(username: &str) -> Option<UpstreamError> {
    match username {
        "ghost-user-404" => Some(UpstreamError::from_status(404, username)),
        "limited" => Some(UpstreamError::from_status(403, username)),
        "broken" => Some(UpstreamError::from_status(502, username)),
        "offline" => Some(UpstreamError::Transport("connection refused".into())),
        _ => None,
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn user(&self, username: &str) -> Result<ProfileSummary, UpstreamError> {
        if let Some(e) = upstream_failure(username) {
            return Err(e);
        }
        Ok(ProfileSummary {
            login: username.to_string(),
            public_repos: 8,
            followers: 12,
            ..Default::default()
        })
    }

    async fn user_repos(&self, username: &str) -> Result<Vec<RepositorySummary>, UpstreamError> {
        if let Some(e) = upstream_failure(username) {
            return Err(e);
        }
        Ok(self.repos.clone())
    }
}

/// Fails every send, forwarding each attempted message to the test.
struct RecordingMailer {
    attempts: mpsc::UnboundedSender<OutgoingEmail>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        let _ = self.attempts.send(email.clone());
        anyhow::bail!("mail provider unavailable")
    }
}

fn repo(id: i64, stars: i64, days_ago: i64) -> RepositorySummary {
    RepositorySummary {
        id,
        name: format!("repo-{}", id),
        stargazers_count: stars,
        forks_count: 1,
        updated_at: Some(Utc::now() - Duration::days(days_ago)),
        language: Some(if id % 2 == 0 { "Rust" } else { "TypeScript" }.to_string()),
        ..Default::default()
    }
}

fn sample_repos() -> Vec<RepositorySummary> {
    let mut repos: Vec<RepositorySummary> = (1..=30).map(|i| repo(i, i % 7, i * 3)).collect();
    repos[0].fork = true;
    repos[1].archived = true;
    repos
}

struct Harness {
    app: Router,
    store: Arc<InMemoryContactStore>,
}

fn harness_with_mailer(mailer: Option<Arc<dyn Mailer>>) -> Harness {
    let store = Arc::new(InMemoryContactStore::new());
    let mail = MailConfig {
        notify_to: Some("owner@example.com".into()),
        ..MailConfig::default()
    };
    let contacts = ContactService::new(store.clone(), mailer, mail);
    let github = Arc::new(FakeGitHub {
        repos: sample_repos(),
    });
    let state = AppState::new(Config::minimal(), github, contacts);
    Harness {
        app: router(state),
        store,
    }
}

fn harness() -> Harness {
    harness_with_mailer(None)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============ Repositories ============

#[tokio::test]
async fn test_repos_ranked_and_truncated() {
    let h = harness();
    let (status, headers, body) = send(&h.app, get("/api/repos/octo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, s-maxage=600, stale-while-revalidate=1200"
    );

    let repos = body["repositories"].as_array().unwrap();
    assert_eq!(repos.len(), 20);
    assert!(repos
        .iter()
        .all(|r| r["fork"] == false && r["archived"] == false));

    for pair in repos.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let (sa, sb) = (
            a["stargazers_count"].as_i64().unwrap(),
            b["stargazers_count"].as_i64().unwrap(),
        );
        assert!(sa > sb || (sa == sb && a["updated_at"].as_str() >= b["updated_at"].as_str()));
    }

    let total: i64 = repos
        .iter()
        .map(|r| r["stargazers_count"].as_i64().unwrap())
        .sum();
    assert_eq!(body["stats"]["total_stars"], total);
    assert_eq!(body["stats"]["total_repos"], 20);
    assert!(repos[0]["computed_metrics"]["activity_level"].is_string());
}

#[tokio::test]
async fn test_repos_alias_path() {
    let h = harness();
    let (status, _, body) = send(&h.app, get("/api/github/repos/octo")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["stats"]["languages"].as_array().unwrap().len() <= 2);
}

#[tokio::test]
async fn test_repos_not_found() {
    let h = harness();
    let (status, _, body) = send(&h.app, get("/api/repos/ghost-user-404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
    assert!(body["message"].as_str().unwrap().contains("ghost-user-404"));
}

#[tokio::test]
async fn test_rate_limit_always_surfaces_as_429() {
    let h = harness();
    for uri in ["/api/repos/limited", "/api/profile/limited"] {
        let (status, _, body) = send(&h.app, get(uri)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS, "{}", uri);
        assert_eq!(body["error"], "RateLimited");
    }
}

#[tokio::test]
async fn test_other_upstream_status_is_500_with_status() {
    let h = harness();
    let (status, _, body) = send(&h.app, get("/api/repos/broken")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "UpstreamError");
    assert_eq!(body["status"], 502);
}

#[tokio::test]
async fn test_transport_failure_is_500_without_status() {
    let h = harness();
    let (status, _, body) = send(&h.app, get("/api/profile/offline")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "UpstreamError");
    assert!(body.get("status").is_none());
}

#[tokio::test]
async fn test_blank_username_rejected() {
    let h = harness();
    let (status, _, body) = send(&h.app, get("/api/repos/%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
}

// ============ Profile ============

#[tokio::test]
async fn test_profile_enriched() {
    let h = harness();
    let (status, headers, body) = send(&h.app, get("/api/profile/octo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, s-maxage=300, stale-while-revalidate=600"
    );
    assert_eq!(body["login"], "octo");
    assert_eq!(body["computed_stats"]["activity_score"], 28);
}

#[tokio::test]
async fn test_profile_not_found() {
    let h = harness();
    let (status, _, body) = send(&h.app, get("/api/github/user/ghost-user-404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

// ============ Contact ============

#[tokio::test]
async fn test_contact_empty_name_rejected() {
    let h = harness();
    let (status, _, body) = send(
        &h.app,
        post_json("/api/contact", r#"{"name":"","email":"a@b.com","message":"hi"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_contact_bad_email_rejected() {
    let h = harness();
    let (status, _, body) = send(
        &h.app,
        post_json(
            "/api/contact",
            r#"{"name":"A","email":"not-an-email","message":"hi"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
}

#[tokio::test]
async fn test_contact_malformed_json_rejected() {
    let h = harness();
    let (status, _, body) = send(&h.app, post_json("/api/contact", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
}

#[tokio::test]
async fn test_contact_valid_submission_recorded() {
    let h = harness();
    let (status, _, body) = send(
        &h.app,
        post_json(
            "/api/contact",
            r#"{"name":"Ada","email":"ada@example.org","subject":"Hello","message":"Nice site"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let id = body["id"].as_i64().unwrap();

    let rows = h.store.recent(10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].subject.as_deref(), Some("Hello"));
}

#[tokio::test]
async fn test_contact_succeeds_when_mail_fails() {
    let (tx, mut attempts) = mpsc::unbounded_channel();
    let mailer: Arc<dyn Mailer> = Arc::new(RecordingMailer { attempts: tx });
    let h = harness_with_mailer(Some(mailer));
    let (status, _, body) = send(
        &h.app,
        post_json(
            "/api/contact",
            r#"{"name":"Ada","email":"ada@example.org","message":"hi"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(h.store.count().await.unwrap(), 1);

    let mut recipients = Vec::new();
    for _ in 0..2 {
        let email = tokio::time::timeout(std::time::Duration::from_secs(5), attempts.recv())
            .await
            .expect("mail dispatch did not run")
            .expect("mailer dropped");
        recipients.extend(email.to);
    }
    recipients.sort();
    assert_eq!(recipients, vec!["ada@example.org", "owner@example.com"]);
}

// ============ Methods / CORS ============

#[tokio::test]
async fn test_options_returns_200_with_cors() {
    let h = harness();
    for uri in ["/api/contact", "/api/repos/octo", "/api/profile/octo"] {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .header(header::ORIGIN, "https://portfolio.example")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}

#[tokio::test]
async fn test_preflight_allows_post() {
    let h = harness();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/contact")
        .header(header::ORIGIN, "https://portfolio.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
}

#[tokio::test]
async fn test_unsupported_methods_rejected() {
    let h = harness();
    let cases = [
        (Method::DELETE, "/api/repos/octo"),
        (Method::POST, "/api/profile/octo"),
        (Method::GET, "/api/contact"),
        (Method::PUT, "/api/contact"),
    ];
    for (method, uri) in cases {
        let req = Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        assert_eq!(body["error"], "MethodNotAllowed");
    }
}

#[tokio::test]
async fn test_unknown_route_and_health() {
    let h = harness();
    let (status, _, body) = send(&h.app, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");

    let (status, _, body) = send(&h.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
