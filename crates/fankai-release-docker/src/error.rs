//! Docker-specific error types

use thiserror::Error;

/// Docker-specific error type
#[derive(Error, Debug)]
pub enum DockerError {
    /// Bollard client error
    #[error("Docker client error: {0}")]
    Client(#[from] bollard::errors::Error),

    /// Build failed
    #[error("Docker build failed: {reason}")]
    BuildFailed { reason: String },

    /// Push failed
    #[error("Docker push failed for {reference}: {reason}")]
    PushFailed { reference: String, reason: String },

    /// Manifest assembly or push failed
    #[error("Manifest operation failed for {reference}: {reason}")]
    ManifestFailed { reference: String, reason: String },

    /// Invalid build context
    #[error("Invalid build context {path}: {reason}")]
    InvalidContext { path: String, reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Docker operations
pub type Result<T> = std::result::Result<T, DockerError>;
