//! Error types for nova-sp
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.

use crate::loader::LoadError;
use thiserror::Error;

/// Main error type for the scene player service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Document load failures (surfaced to the UI with a retry action)
    #[error(transparent)]
    Load(#[from] LoadError),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the nova-sp Error
pub type Result<T> = std::result::Result<T, Error>;
