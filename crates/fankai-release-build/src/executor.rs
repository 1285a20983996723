//! Per-task build execution
//!
//! One executor invocation handles one matrix entry in complete isolation:
//! its own artifact directory under the staging root, its own request; no
//! state is shared with sibling tasks running concurrently.

use std::path::PathBuf;
use std::sync::Arc;

use fankai_release_core::{Architecture, BuildTask, PackagingDefaults, PackagingOptions};
use tokio::fs;
use tracing::{debug, info};

use crate::error::Result;
use crate::packager::{PackageRequest, PackagerService};

/// Task executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Root directory artifact directories are created under
    pub staging_root: PathBuf,
    /// Dependency manifest handed to every packaging invocation
    pub dependency_manifest: PathBuf,
    /// Shared packaging inputs
    pub defaults: PackagingDefaults,
}

/// A completed task's artifact: the built binary directory plus its typed
/// platform, carried through to the redistributor.
#[derive(Debug, Clone)]
pub struct TaskArtifact {
    pub task: BuildTask,
    pub dir: PathBuf,
}

/// Executes single build tasks against the packaging service
pub struct TaskExecutor {
    config: ExecutorConfig,
    packager: Arc<dyn PackagerService>,
}

impl TaskExecutor {
    /// Create a new task executor
    pub fn new(config: ExecutorConfig, packager: Arc<dyn PackagerService>) -> Self {
        Self { config, packager }
    }

    /// Execute one build task and stage its artifact under
    /// `<staging root>/<output name>-<runner label>`.
    pub async fn execute(&self, task: &BuildTask) -> Result<TaskArtifact> {
        let artifact_name = task.artifact_name();
        let dist_dir = self.config.staging_root.join(&artifact_name);

        debug!("Staging task {} into {}", artifact_name, dist_dir.display());
        fs::create_dir_all(&dist_dir).await?;

        let options = PackagingOptions::derive(&task.script, task.platform, &self.config.defaults);

        let request = PackageRequest {
            entry_file: PathBuf::from(&task.script.path),
            options,
            architecture: Architecture::detect(),
            dependency_manifest: self.config.dependency_manifest.clone(),
            dist_dir: dist_dir.clone(),
        };

        let binary = self.packager.package(&request).await?;

        info!("Task {} produced {}", artifact_name, binary.display());
        Ok(TaskArtifact { task: task.clone(), dir: dist_dir })
    }
}
