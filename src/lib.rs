//! # Minaret Library
//!
//! Minaret is the content-managed website of a mosque community: a public
//! site (prayer times, events, donation info) and an admin API (login,
//! prayer-time/event/settings management, profile changes) backed by one
//! SQLite file, with a push channel that mirrors every admin edit to all
//! open browser tabs without a reload.
//!
//! ## Overview
//!
//! - `config`: deployment configuration loaded from a JSON5 file
//! - `error`: the crate-wide error type and its HTTP mapping
//! - `store`: SQLite schema, seeding and CRUD for all four tables
//! - `notify`: transport-independent broadcast of store mutations plus the
//!   SSE endpoint browsers subscribe to
//! - `schedule`: pure next-prayer / prayer-window derivations
//! - `auth`: Argon2id password hashing and verification
//! - `prayer_times`, `events`, `settings`, `admin`: JSON API handlers
//! - `index`: the server-rendered public landing page
//! - `server`: router assembly, CORS, bind and graceful shutdown
//!
//! ## Getting Started
//!
//! ```no_run
//! use minaret::server;
//! use std::path::PathBuf;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), minaret::error::MinaretError> {
//!     let cancel_token = CancellationToken::new();
//!     let config_path: Option<PathBuf> = None;
//!
//!     server::run(3001, config_path, cancel_token).await
//! }
//! ```
//!
//! ## Data flow
//!
//! Admin UI sends an HTTP write, the handler validates and mutates the
//! store, publishes the post-write canonical value on the broadcast channel,
//! and every connected tab receives it over SSE. Clients that connect later
//! rely on their initial pull-on-load; delivery is best-effort with no
//! acknowledgment or retry.

/// Custom error types module
///
/// Defines the `MinaretError` enum, the `Result` alias, and the mapping of
/// every failure to an HTTP status and JSON error body.
pub mod error;

/// Configuration management module
///
/// Loads deployment settings (site name, database file, CORS origins, seed
/// admin) from a JSON5 file, with built-in defaults when none exists.
pub mod config;

/// SQLite access layer
///
/// Connection pool, schema creation, first-boot seeding and the CRUD
/// operations for prayer times, events, settings and the admin account.
pub mod store;

/// Mutation fan-out module
///
/// The broadcast channel every mutating handler publishes to, and the SSE
/// endpoint that streams those messages to connected browser tabs.
pub mod notify;

/// Prayer schedule derivations
///
/// Pure functions computing the next prayer and the ±15-minute prayer
/// window from the five fixed daily entries.
pub mod schedule;

/// Credential handling
pub mod auth;

/// Prayer-time API handlers
pub mod prayer_times;

/// Event API handlers
pub mod events;

/// Settings API handlers
pub mod settings;

/// Admin login and profile handlers
pub mod admin;

/// Public landing page
pub mod index;

/// Server operations module
///
/// Assembles the router, applies CORS, binds the listener and manages
/// graceful shutdown.
pub mod server;
