//! # Minaret Main Application Entry Point
//!
//! Parses command-line arguments, initializes tracing, and runs the web
//! server until interrupted.
//!
//! - First argument: port number (defaults to 3001)
//! - Second argument: path to the configuration file (defaults to
//!   "config.json5", built-in defaults when absent)
//!
//! Log levels are controlled through the `RUST_LOG` environment variable.

use std::env;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod admin;
mod auth;
mod config;
mod error;
mod events;
mod index;
mod notify;
mod prayer_times;
mod schedule;
mod server;
mod settings;
mod store;

use crate::error::MinaretError;

/// Entry point: tracing setup, argument parsing, server lifecycle.
///
/// # Errors
///
/// Returns an error if the server fails to start, the configuration cannot
/// be loaded, or the database cannot be opened.
#[tokio::main]
async fn main() -> Result<(), MinaretError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3001);

    let mut config_file_path: Option<PathBuf> = None;

    if let Some(arg2) = env::args().nth(2) {
        config_file_path = Some(PathBuf::from(arg2));
    }

    tracing::info!("Starting Minaret application");

    let cancel_token = CancellationToken::new();

    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown_token.cancel();
        }
    });

    server::run(port, config_file_path, cancel_token).await?;

    tracing::info!("Minaret application shutting down");
    Ok(())
}
