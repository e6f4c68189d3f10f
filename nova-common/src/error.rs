//! Shared error type for NOVA services

use thiserror::Error;

/// Common error type for cross-service infrastructure concerns
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file or endpoint resolution errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the shared Error
pub type Result<T> = std::result::Result<T, Error>;
