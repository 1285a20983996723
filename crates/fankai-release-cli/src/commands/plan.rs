//! Plan command implementation

use std::path::PathBuf;

use color_eyre::eyre::{Context, Result};
use fankai_release_build::{GitCli, VcsSurface};
use fankai_release_config::Config;
use fankai_release_core::{build_matrix, select_scripts};

/// Plan command implementation: print the build matrix without executing it
pub struct PlanCommand {
    config_path: PathBuf,
    revision: String,
    json: bool,
}

impl PlanCommand {
    pub fn new(config_path: PathBuf, revision: String, json: bool) -> Self {
        Self { config_path, revision, json }
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::from_file(&self.config_path).with_context(|| {
            format!("Failed to load config from {}", self.config_path.display())
        })?;

        let vcs = GitCli;
        let changes = vcs
            .changed_files(&config.source_repo, &self.revision)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to read diff: {}", e))?;

        let scripts = select_scripts(&changes);
        let matrix = build_matrix(&scripts);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&matrix)?);
            return Ok(());
        }

        if matrix.is_empty() {
            println!("No eligible changes in {}; matrix is empty.", self.revision);
            return Ok(());
        }

        println!("Build matrix for {} ({} tasks):", self.revision, matrix.len());
        for task in &matrix {
            println!(
                "  {:<30} {:<12} -> {}",
                task.script.path,
                task.platform.id(),
                task.artifact_name()
            );
        }

        Ok(())
    }
}
