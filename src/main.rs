//! # Portfolio API CLI (`folio`)
//!
//! The `folio` binary runs the portfolio backend and a few maintenance
//! commands around it.
//!
//! ## Usage
//!
//! ```bash
//! folio --config ./config/folio.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `folio init` | Create the SQLite database and run schema migrations |
//! | `folio serve` | Start the HTTP server |
//! | `folio profile <username>` | Fetch an enriched GitHub profile and print it as JSON |
//! | `folio repos <username>` | Run the repository aggregator and print the result as JSON |
//! | `folio contacts` | List the newest contact submissions |
//! | `folio stats` | Show database statistics |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `info`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use portfolio_api::github::GitHubClient;
use portfolio_api::{config, migrate, proxy, server, stats};

/// Portfolio API: GitHub profile proxy and contact form backend.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/folio.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "folio",
    about = "Portfolio API: GitHub profile proxy and contact form backend",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/folio.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the contacts table. Safe to
    /// run repeatedly.
    Init,

    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Fetch a GitHub profile with its activity score.
    Profile {
        /// GitHub username.
        username: String,
    },

    /// Fetch and rank a user's repositories.
    Repos {
        /// GitHub username.
        username: String,
    },

    /// List the newest contact submissions.
    Contacts {
        /// Maximum number of submissions to show.
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Show database statistics.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Profile { username } => {
            let client = GitHubClient::new(&cfg.github)?;
            let username = proxy::parse_username(&username)?;
            let profile = proxy::fetch_profile(&client, username).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Repos { username } => {
            let client = GitHubClient::new(&cfg.github)?;
            let username = proxy::parse_username(&username)?;
            let repos = proxy::fetch_repositories(&client, username)
                .await
                .with_context(|| format!("Failed to fetch repositories for {}", username))?;
            println!("{}", serde_json::to_string_pretty(&repos)?);
        }
        Commands::Contacts { limit } => {
            stats::run_contacts(&cfg, limit).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
