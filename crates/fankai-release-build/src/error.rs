//! Error types for the orchestration crate

use thiserror::Error;

/// Release-pipeline error types
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Packaging service failed for one task
    #[error("Packaging failed for task {task}: {reason}")]
    PackagingFailed { task: String, reason: String },

    /// One or more matrix entries failed; the stage gate refuses to proceed
    #[error("{failed} of {total} build tasks failed; redistribution refused")]
    StageGate { failed: usize, total: usize },

    /// Artifact redistribution failed
    #[error("Redistribution failed: {reason}")]
    Redistribution { reason: String },

    /// Version-control surface failed
    #[error("Version-control operation failed: {reason}")]
    Vcs { reason: String },

    /// Completion signal could not be delivered
    #[error("Notification delivery failed: {reason}")]
    Notification { reason: String },

    /// Image pipeline failed
    #[error("Image pipeline failed: {reason}")]
    Images { reason: String },

    /// Invalid pipeline configuration
    #[error("Invalid pipeline configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// Docker error
    #[error("Docker error: {0}")]
    Docker(#[from] fankai_release_docker::DockerError),

    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] fankai_release_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a packaging failure scoped to one task
    pub fn packaging(task: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PackagingFailed { task: task.into(), reason: reason.into() }
    }

    /// Create a redistribution error
    pub fn redistribution(reason: impl Into<String>) -> Self {
        Self::Redistribution { reason: reason.into() }
    }

    /// Create a version-control error
    pub fn vcs(reason: impl Into<String>) -> Self {
        Self::Vcs { reason: reason.into() }
    }

    /// Create a notification error
    pub fn notification(reason: impl Into<String>) -> Self {
        Self::Notification { reason: reason.into() }
    }

    /// Create an image pipeline error
    pub fn images(reason: impl Into<String>) -> Self {
        Self::Images { reason: reason.into() }
    }
}
