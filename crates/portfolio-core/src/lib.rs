//! # Portfolio Core
//!
//! I/O-free logic for the portfolio backend: upstream GitHub schemas,
//! derived repository metrics, aggregation, contact validation and the
//! contact store abstraction.
//!
//! This crate contains no tokio, sqlx, reqwest or filesystem code. The
//! application crate supplies the HTTP client, the SQLite store and the
//! server on top of it.

pub mod aggregate;
pub mod contact;
pub mod error;
pub mod models;
pub mod profile;
pub mod store;

pub use error::{UpstreamError, ValidationError};
