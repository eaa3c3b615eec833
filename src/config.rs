//! TOML configuration parsing and validation.
//!
//! The configuration is loaded once at startup and passed explicitly to the
//! server, the GitHub client and the mailer. Secrets may come from the file
//! or from the environment (`GITHUB_TOKEN`, `RESEND_API_KEY`); the
//! environment is only read inside [`load_config`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitHubConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_github_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional bearer token. Raises the upstream rate limit; its absence
    /// is not an error.
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            timeout_secs: default_github_timeout_secs(),
            token: None,
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_user_agent() -> String {
    "Portfolio-Website/1.0".to_string()
}
fn default_github_timeout_secs() -> u64 {
    10
}

/// `Cache-Control` freshness windows for the proxy endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_repos_max_age")]
    pub repos_max_age_secs: u64,
    #[serde(default = "default_repos_stale")]
    pub repos_stale_secs: u64,
    #[serde(default = "default_profile_max_age")]
    pub profile_max_age_secs: u64,
    #[serde(default = "default_profile_stale")]
    pub profile_stale_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            repos_max_age_secs: default_repos_max_age(),
            repos_stale_secs: default_repos_stale(),
            profile_max_age_secs: default_profile_max_age(),
            profile_stale_secs: default_profile_stale(),
        }
    }
}

fn default_repos_max_age() -> u64 {
    600
}
fn default_repos_stale() -> u64 {
    1200
}
fn default_profile_max_age() -> u64 {
    300
}
fn default_profile_stale() -> u64 {
    600
}

impl CacheConfig {
    pub fn repos_header(&self) -> String {
        cache_directive(self.repos_max_age_secs, self.repos_stale_secs)
    }

    pub fn profile_header(&self) -> String {
        cache_directive(self.profile_max_age_secs, self.profile_stale_secs)
    }
}

fn cache_directive(max_age: u64, stale: u64) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        max_age, stale
    )
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default = "default_mail_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Where new-submission notifications go.
    #[serde(default)]
    pub notify_to: Option<String>,
    #[serde(default = "default_mail_from")]
    pub from: String,
    #[serde(default = "default_mail_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_mail_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: default_mail_provider(),
            api_key: None,
            notify_to: None,
            from: default_mail_from(),
            endpoint: default_mail_endpoint(),
            timeout_secs: default_mail_timeout_secs(),
        }
    }
}

fn default_mail_provider() -> String {
    "disabled".to_string()
}
fn default_mail_from() -> String {
    "Portfolio Contact <onboarding@resend.dev>".to_string()
}
fn default_mail_endpoint() -> String {
    "https://api.resend.com/emails".to_string()
}
fn default_mail_timeout_secs() -> u64 {
    10
}

impl MailConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl Config {
    /// A configuration with an in-directory database and defaults for
    /// everything else, for building a router in tests.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/folio.sqlite"),
            },
            server: ServerConfig {
                bind: "127.0.0.1:8080".to_string(),
            },
            github: GitHubConfig::default(),
            cache: CacheConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Environment fallbacks for secrets
    if config.github.token.is_none() {
        config.github.token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
    }
    if config.mail.api_key.is_none() {
        config.mail.api_key = std::env::var("RESEND_API_KEY").ok().filter(|k| !k.is_empty());
    }

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.github.timeout_secs == 0 {
        anyhow::bail!("github.timeout_secs must be > 0");
    }

    url::Url::parse(&config.github.api_base)
        .with_context(|| format!("github.api_base is not a valid URL: {}", config.github.api_base))?;

    match config.mail.provider.as_str() {
        "disabled" => {}
        "resend" => {
            if config.mail.notify_to.is_none() {
                anyhow::bail!("mail.notify_to must be set when provider is 'resend'");
            }
            if config.mail.api_key.is_none() {
                anyhow::bail!(
                    "mail.api_key (or RESEND_API_KEY) must be set when provider is 'resend'"
                );
            }
            if config.mail.timeout_secs == 0 {
                anyhow::bail!("mail.timeout_secs must be > 0");
            }
        }
        other => anyhow::bail!(
            "Unknown mail provider: '{}'. Must be disabled or resend.",
            other
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_src)?;
        validate(&config)?;
        Ok(config)
    }

    const BASE: &str = r#"
[db]
path = "/tmp/folio.sqlite"

[server]
bind = "127.0.0.1:9000"
"#;

    #[test]
    fn test_defaults_applied() {
        let cfg = parse(BASE).unwrap();
        assert_eq!(cfg.github.api_base, "https://api.github.com");
        assert_eq!(cfg.github.timeout_secs, 10);
        assert!(!cfg.mail.is_enabled());
        assert_eq!(
            cfg.cache.repos_header(),
            "public, s-maxage=600, stale-while-revalidate=1200"
        );
        assert_eq!(
            cfg.cache.profile_header(),
            "public, s-maxage=300, stale-while-revalidate=600"
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let src = format!("{}\n[github]\ntimeout_secs = 0\n", BASE);
        assert!(parse(&src).is_err());
    }

    #[test]
    fn test_bad_api_base_rejected() {
        let src = format!("{}\n[github]\napi_base = \"not a url\"\n", BASE);
        assert!(parse(&src).is_err());
    }

    #[test]
    fn test_unknown_mail_provider_rejected() {
        let src = format!("{}\n[mail]\nprovider = \"smtp\"\n", BASE);
        let err = parse(&src).unwrap_err().to_string();
        assert!(err.contains("Unknown mail provider"));
    }

    #[test]
    fn test_resend_requires_recipient_and_key() {
        let src = format!("{}\n[mail]\nprovider = \"resend\"\napi_key = \"k\"\n", BASE);
        assert!(parse(&src).is_err());

        let src = format!(
            "{}\n[mail]\nprovider = \"resend\"\napi_key = \"k\"\nnotify_to = \"me@example.com\"\n",
            BASE
        );
        assert!(parse(&src).unwrap().mail.is_enabled());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(
            &path,
            format!("{}\n[github]\ntoken = \"abc\"\n", BASE),
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.github.token.as_deref(), Some("abc"));
        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
    }
}
