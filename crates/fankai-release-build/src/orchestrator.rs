//! Release pipeline orchestration
//!
//! Drives the native-binary pipeline end to end: change selection, matrix
//! generation, the parallel build fan-out, the stage gate, redistribution,
//! the deploy commit and the completion signals. Sibling tasks are
//! independent failure domains: one platform's failure never cancels the
//! others, but any failure stops the pipeline at the barrier.

use std::sync::Arc;

use chrono::Utc;
use fankai_release_core::{build_matrix, select_scripts};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::context::{PipelineState, ReleaseContext, RunStats, TaskOutcome};
use crate::error::{ReleaseError, Result};
use crate::executor::{ExecutorConfig, TaskExecutor};
use crate::notify::CompletionSurface;
use crate::packager::PackagerService;
use crate::redistribute::{ArtifactRedistributor, RedistributionReport};
use crate::vcs::{CommitOutcome, VcsSurface};

/// Outcome of one full pipeline run
#[derive(Debug)]
pub struct RunReport {
    pub state: PipelineState,
    pub stats: RunStats,
    pub outcomes: Vec<TaskOutcome>,
    pub redistribution: Option<RedistributionReport>,
    pub commit: Option<CommitOutcome>,
}

impl RunReport {
    fn skipped(stats: RunStats) -> Self {
        Self {
            state: PipelineState::Skipped,
            stats,
            outcomes: Vec::new(),
            redistribution: None,
            commit: None,
        }
    }
}

/// Main release pipeline
pub struct ReleasePipeline {
    context: ReleaseContext,
    packager: Arc<dyn PackagerService>,
    vcs: Arc<dyn VcsSurface>,
    completion: Arc<dyn CompletionSurface>,
    state: PipelineState,
    stats: RunStats,
}

impl ReleasePipeline {
    /// Create a new pipeline over the given context and collaborators
    pub fn new(
        context: ReleaseContext,
        packager: Arc<dyn PackagerService>,
        vcs: Arc<dyn VcsSurface>,
        completion: Arc<dyn CompletionSurface>,
    ) -> Self {
        Self {
            context,
            packager,
            vcs,
            completion,
            state: PipelineState::Idle,
            stats: RunStats::default(),
        }
    }

    /// Current pipeline state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Current run statistics
    pub fn stats(&self) -> RunStats {
        self.stats.clone()
    }

    /// Run the pipeline to completion
    pub async fn run(&mut self) -> Result<RunReport> {
        let result = self.run_stages().await;
        if result.is_err() {
            self.state = PipelineState::Failed;
            self.stats.end_time = Some(Utc::now());
        }
        result
    }

    async fn run_stages(&mut self) -> Result<RunReport> {
        self.stats.start_time = Some(Utc::now());
        let config = self.context.config.clone();

        self.state = PipelineState::Selecting;
        let changes = self
            .vcs
            .changed_files(&config.source_repo, &self.context.revision)
            .await?;
        let scripts = select_scripts(&changes);
        let matrix = build_matrix(&scripts);

        if matrix.is_empty() {
            // Control-flow gate, not an error: nothing eligible changed.
            info!(
                "No eligible changes in {}, skipping all downstream stages",
                self.context.revision_short()
            );
            self.state = PipelineState::Skipped;
            self.stats.end_time = Some(Utc::now());
            return Ok(RunReport::skipped(self.stats.clone()));
        }

        info!(
            "Matrix for {}: {} scripts x {} platforms = {} tasks",
            self.context.revision_short(),
            scripts.len(),
            fankai_release_core::Platform::ALL.len(),
            matrix.len()
        );

        self.state = PipelineState::Building;
        self.stats.total_tasks = matrix.len();

        let executor = TaskExecutor::new(
            ExecutorConfig {
                staging_root: config.staging_dir.clone(),
                dependency_manifest: config.requirements.clone(),
                defaults: config.packaging.clone(),
            },
            Arc::clone(&self.packager),
        );

        // Fan-out: every task is an independent failure domain. Failures are
        // recorded, never propagated mid-stage, so siblings always run to
        // completion.
        let outcomes: Vec<TaskOutcome> = {
            let executor = &executor;
            stream::iter(matrix)
                .map(|task| async move {
                    match executor.execute(&task).await {
                        Ok(artifact) => TaskOutcome::succeeded(artifact.task, artifact.dir),
                        Err(e) => {
                            warn!("Task {} failed: {}", task.artifact_name(), e);
                            TaskOutcome::failed(task, e.to_string())
                        }
                    }
                })
                .buffer_unordered(config.parallel_jobs.max(1))
                .collect()
                .await
        };

        for outcome in &outcomes {
            if outcome.is_success() {
                self.stats.built_tasks += 1;
            } else {
                self.stats.failed_tasks += 1;
            }
        }

        // Stage gate: a partial artifact set is never merged.
        if self.stats.failed_tasks > 0 {
            return Err(ReleaseError::StageGate {
                failed: self.stats.failed_tasks,
                total: self.stats.total_tasks,
            });
        }

        self.state = PipelineState::Redistributing;
        let redistributor =
            ArtifactRedistributor::new(config.deploy_repo.clone(), config.app_name.clone());
        let redistribution = redistributor.redistribute(&config.staging_dir)?;

        self.state = PipelineState::Committing;
        let message = if self.context.message.is_empty() {
            self.vcs
                .commit_message(&config.source_repo, &self.context.revision)
                .await?
        } else {
            self.context.message.clone()
        };
        let commit = self.vcs.commit_all(&config.deploy_repo, &message).await?;

        self.state = PipelineState::Notifying;
        self.completion
            .trigger_cleanup(&config.notify.cleanup_workflow)
            .await?;
        self.completion.announce(&self.context.revision).await?;

        self.state = PipelineState::Completed;
        self.stats.end_time = Some(Utc::now());
        info!("{}", self.stats.summary());

        Ok(RunReport {
            state: self.state,
            stats: self.stats.clone(),
            outcomes,
            redistribution: Some(redistribution),
            commit: Some(commit),
        })
    }
}
