//! Error types for dayplan-core

use thiserror::Error;

/// Main error type for dayplan-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("chat endpoint error: {0}")]
    ChatApi(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(String),

    /// User-facing form validation failure. The message is shown inline,
    /// exactly as stored here.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] crate::auth::AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dayplan-core
pub type Result<T> = std::result::Result<T, Error>;
