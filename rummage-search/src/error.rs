//! Error types for rummage-search
//!
//! Module-specific errors using thiserror, with an axum response mapping so
//! handlers can return `Result<_, Error>` directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main error type for the rummage-search service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or registry-building errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid request parameter (empty query, bad page number)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found (unknown engine name)
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using rummage-search Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<rummage_common::Error> for Error {
    fn from(err: rummage_common::Error) -> Self {
        match err {
            rummage_common::Error::Config(msg) => Error::Config(msg),
            rummage_common::Error::InvalidInput(msg) => Error::InvalidInput(msg),
            rummage_common::Error::NotFound(msg) => Error::NotFound(msg),
            rummage_common::Error::Io(e) => Error::Io(e),
            rummage_common::Error::Internal(msg) => Error::Internal(msg),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
