//! # Portfolio API
//!
//! Backend for a personal portfolio site: a GitHub profile/repository proxy
//! with derived metrics, and an append-only contact form.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐
//! │  Front end   │──▶│  HTTP (Axum)  │──▶│  GitHub API    │
//! │  (external)  │   │  /api/*       │   │  (upstream)    │
//! └──────────────┘   └──────┬───────┘   └────────────────┘
//!                           │
//!                 ┌─────────┴─────────┐
//!                 ▼                   ▼
//!           ┌──────────┐        ┌──────────┐
//!           │  SQLite   │        │  Mailer  │
//!           │ contacts  │        │ (Resend) │
//!           └──────────┘        └──────────┘
//! ```
//!
//! The pure logic (schemas, aggregation, validation, store trait) lives in
//! the `portfolio-core` crate; this crate adds configuration, I/O and the
//! server.
//!
//! ## Quick Start
//!
//! ```bash
//! folio init                 # create database
//! folio repos octocat        # run the aggregator once, print JSON
//! folio serve                # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`github`] | Upstream client trait and `reqwest` implementation |
//! | [`proxy`] | Profile and repository lookups with enrichment |
//! | [`contact`] | Contact submission workflow |
//! | [`mailer`] | Best-effort notification and confirmation e-mail |
//! | [`server`] | HTTP server (Axum) with CORS |
//! | [`sqlite_store`] | SQLite-backed contact store |
//! | [`stats`] | Database summary for `folio stats` |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |

pub mod config;
pub mod contact;
pub mod db;
pub mod github;
pub mod mailer;
pub mod migrate;
pub mod proxy;
pub mod server;
pub mod sqlite_store;
pub mod stats;

pub use portfolio_core::{models, store};
