//! Release command implementation

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Context, Result};
use fankai_release_build::{
    GitCli, HttpCompletionSurface, PipelineState, PyInstaller, ReleaseContext, ReleasePipeline,
};
use fankai_release_config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Release command implementation
pub struct ReleaseCommand {
    config_path: PathBuf,
    revision: String,
    message: Option<String>,
    staging_dir: Option<PathBuf>,
    parallel_jobs: Option<usize>,
}

impl ReleaseCommand {
    pub fn new(
        config_path: PathBuf,
        revision: String,
        message: Option<String>,
        staging_dir: Option<PathBuf>,
        parallel_jobs: Option<usize>,
    ) -> Self {
        Self { config_path, revision, message, staging_dir, parallel_jobs }
    }

    pub async fn execute(&self) -> Result<()> {
        info!("Starting release pipeline for {}", self.revision);

        // Load configuration
        let mut config = Config::from_file(&self.config_path).with_context(|| {
            format!("Failed to load config from {}", self.config_path.display())
        })?;

        // Override config with command line options
        if let Some(staging_dir) = &self.staging_dir {
            config.staging_dir = staging_dir.clone();
        }
        if let Some(jobs) = self.parallel_jobs {
            config.parallel_jobs = jobs;
        }

        println!("✓ Configuration loaded and validated");
        info!("Staging directory: {}", config.staging_dir.display());
        info!("Parallel jobs: {}", config.parallel_jobs);

        let cleanup_token = std::env::var("FANKAI_GITHUB_TOKEN").ok();
        let notify_config = config.notify.clone();

        let context = ReleaseContext::new(
            config,
            self.revision.clone(),
            self.message.clone().unwrap_or_default(),
        );

        let mut pipeline = ReleasePipeline::new(
            context,
            Arc::new(PyInstaller::new()),
            Arc::new(GitCli),
            Arc::new(HttpCompletionSurface::new(notify_config, cleanup_token)),
        );

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("Invalid progress template"),
        );
        spinner.set_message("Running release pipeline...");
        spinner.enable_steady_tick(Duration::from_millis(120));

        let report = pipeline.run().await;
        spinner.finish_and_clear();

        let report = report.map_err(|e| color_eyre::eyre::eyre!("Release failed: {}", e))?;

        match report.state {
            PipelineState::Skipped => {
                println!("\nNo eligible changes in {}; nothing to release.", self.revision);
            }
            _ => {
                println!("\n✨ Release completed: {}", report.stats.summary());
                if let Some(redistribution) = &report.redistribution {
                    for (name, platform) in &redistribution.merged {
                        println!("  {name} -> {}", platform.deploy_dir());
                    }
                    for skipped in &redistribution.skipped {
                        println!("  ⚠ skipped unrecognized artifact directory {skipped}");
                    }
                }
            }
        }

        Ok(())
    }
}
