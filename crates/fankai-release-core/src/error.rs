//! Error types for the core library

use thiserror::Error;

/// Core error type shared across the release pipeline crates.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid source path
    #[error("Invalid source path {path}: {reason}")]
    InvalidPath { path: String, reason: String },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
