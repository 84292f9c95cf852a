//! Custom error types for the Minaret application
//!
//! This module defines custom error types and implements the necessary traits
//! to properly handle errors throughout the application. Every failure that
//! reaches a handler boundary is turned into a JSON error body here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Main error type for the Minaret application
#[derive(Debug)]
pub enum MinaretError {
    /// Error occurred while parsing the bind address
    AddressParse(std::net::AddrParseError),

    /// I/O error (socket binding, reading files)
    Io(std::io::Error),

    /// Error occurred while parsing configuration
    ConfigParse(json5::Error),

    /// Error returned by the SQLite store
    Database(sqlx::Error),

    /// Error while hashing or verifying a password
    PasswordHash(argon2::password_hash::Error),

    /// Request body failed validation
    Validation(String),

    /// Credentials did not match a stored admin record
    Unauthorized(String),

    /// Requested record does not exist
    NotFound(String),

    /// A unique constraint was violated
    Conflict(String),

    /// Generic error with a message
    Generic(String),
}

impl fmt::Display for MinaretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinaretError::AddressParse(e) => {
                write!(f, "Failed to parse network address: {e}")
            }
            MinaretError::Io(e) => {
                write!(f, "I/O error: {e}")
            }
            MinaretError::ConfigParse(e) => {
                write!(f, "Failed to parse configuration: {e}")
            }
            MinaretError::Database(e) => {
                write!(f, "Database error: {e}")
            }
            MinaretError::PasswordHash(e) => {
                write!(f, "Password hash error: {e}")
            }
            MinaretError::Validation(msg)
            | MinaretError::Unauthorized(msg)
            | MinaretError::NotFound(msg)
            | MinaretError::Conflict(msg) => f.write_str(msg),
            MinaretError::Generic(msg) => {
                write!(f, "Error: {msg}")
            }
        }
    }
}

impl std::error::Error for MinaretError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MinaretError::AddressParse(e) => Some(e),
            MinaretError::Io(e) => Some(e),
            MinaretError::ConfigParse(e) => Some(e),
            MinaretError::Database(e) => Some(e),
            MinaretError::PasswordHash(e) => Some(e),
            MinaretError::Validation(_)
            | MinaretError::Unauthorized(_)
            | MinaretError::NotFound(_)
            | MinaretError::Conflict(_)
            | MinaretError::Generic(_) => None,
        }
    }
}

impl From<std::net::AddrParseError> for MinaretError {
    fn from(error: std::net::AddrParseError) -> Self {
        MinaretError::AddressParse(error)
    }
}

impl From<std::io::Error> for MinaretError {
    fn from(error: std::io::Error) -> Self {
        MinaretError::Io(error)
    }
}

impl From<json5::Error> for MinaretError {
    fn from(error: json5::Error) -> Self {
        MinaretError::ConfigParse(error)
    }
}

impl From<sqlx::Error> for MinaretError {
    fn from(error: sqlx::Error) -> Self {
        MinaretError::Database(error)
    }
}

impl From<argon2::password_hash::Error> for MinaretError {
    fn from(error: argon2::password_hash::Error) -> Self {
        MinaretError::PasswordHash(error)
    }
}

impl From<&str> for MinaretError {
    fn from(message: &str) -> Self {
        MinaretError::Generic(message.to_string())
    }
}

impl From<String> for MinaretError {
    fn from(message: String) -> Self {
        MinaretError::Generic(message)
    }
}

impl IntoResponse for MinaretError {
    /// Maps every error to an HTTP status and a `{"error": message}` body.
    ///
    /// Validation and constraint failures keep their message; anything
    /// unclassified is logged and reported as a generic 500 so store
    /// internals never leak to clients.
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MinaretError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            MinaretError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            MinaretError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            MinaretError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            _ => {
                tracing::error!("Unhandled error at handler boundary: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias using our custom error type
pub type Result<T> = std::result::Result<T, MinaretError>;
