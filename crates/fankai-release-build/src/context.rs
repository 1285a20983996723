//! Release run context and state tracking
//!
//! `ReleaseContext` is the immutable configuration snapshot threaded through
//! the pipeline. Derived values travel in it explicitly; nothing is read
//! from ambient process state between stages.

use chrono::{DateTime, Utc};
use fankai_release_config::Config;
use fankai_release_core::BuildTask;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Pipeline state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    /// Initial state
    Idle,
    /// Reading the triggering revision's diff
    Selecting,
    /// Fan-out build stage running
    Building,
    /// Merging artifacts into the deploy tree
    Redistributing,
    /// Committing the deploy tree
    Committing,
    /// Firing the cleanup trigger and terminal message
    Notifying,
    /// Everything succeeded
    Completed,
    /// Empty matrix; all downstream stages skipped
    Skipped,
    /// A fatal failure stopped the run
    Failed,
}

/// Immutable per-run context
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    /// Triggering revision identifier
    pub revision: String,
    /// Commit message reused verbatim for the redistribution commit
    pub message: String,
    /// Configuration snapshot
    pub config: Config,
}

impl ReleaseContext {
    pub fn new(config: Config, revision: impl Into<String>, message: impl Into<String>) -> Self {
        Self { revision: revision.into(), message: message.into(), config }
    }

    /// Abbreviated revision identifier used in tags and log lines.
    pub fn revision_short(&self) -> &str {
        let end = self.revision.len().min(7);
        &self.revision[..end]
    }
}

/// Outcome of one matrix entry
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub task: BuildTask,
    /// Artifact directory when the task succeeded
    pub artifact_dir: Option<PathBuf>,
    /// Failure description when it did not
    pub error: Option<String>,
}

impl TaskOutcome {
    pub fn succeeded(task: BuildTask, artifact_dir: PathBuf) -> Self {
        Self { task, artifact_dir: Some(artifact_dir), error: None }
    }

    pub fn failed(task: BuildTask, error: impl Into<String>) -> Self {
        Self { task, artifact_dir: None, error: Some(error.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Run statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Total matrix entries
    pub total_tasks: usize,
    /// Successfully built entries
    pub built_tasks: usize,
    /// Failed entries
    pub failed_tasks: usize,
    /// Run start time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Run end time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl RunStats {
    /// Get run duration
    pub fn duration(&self) -> Option<Duration> {
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => {
                let duration_ms = end.timestamp_millis() - start.timestamp_millis();
                Some(Duration::from_millis(duration_ms.max(0) as u64))
            }
            _ => None,
        }
    }

    /// Get run summary
    pub fn summary(&self) -> String {
        let duration = self
            .duration()
            .map(|d| format!(" in {:.1}s", d.as_secs_f32()))
            .unwrap_or_default();

        format!(
            "Built {}/{} tasks successfully{}. {} failed.",
            self.built_tasks, self.total_tasks, duration, self.failed_tasks
        )
    }
}
