//! Images command implementation

use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use fankai_release_build::ImagePipeline;
use fankai_release_config::Config;
use fankai_release_docker::{DockerService, DockerServiceConfig, RegistryAuth};
use tracing::info;

/// Images command implementation
pub struct ImagesCommand {
    config_path: PathBuf,
    revision: String,
}

impl ImagesCommand {
    pub fn new(config_path: PathBuf, revision: String) -> Self {
        Self { config_path, revision }
    }

    pub async fn execute(&self) -> Result<()> {
        info!("Starting image pipeline for {}", self.revision);

        let config = Config::from_file(&self.config_path).with_context(|| {
            format!("Failed to load config from {}", self.config_path.display())
        })?;

        let auth = registry_auth_from_env();
        let service = DockerService::new(DockerServiceConfig { auth, ..Default::default() })
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Docker connection failed: {}", e))?;

        let pipeline = ImagePipeline::new(config.docker.clone(), Arc::new(service));

        let revision_tag = short_revision(&self.revision);
        let report = pipeline
            .run(revision_tag)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Image pipeline failed: {}", e))?;

        println!("\n✨ Image pipeline completed");
        for manifest in &report.manifests {
            println!("  pushed {}", manifest.list.reference());
        }

        Ok(())
    }
}

fn short_revision(revision: &str) -> &str {
    &revision[..revision.len().min(7)]
}

fn registry_auth_from_env() -> Option<RegistryAuth> {
    let username = std::env::var("FANKAI_REGISTRY_USER").ok()?;
    let password = std::env::var("FANKAI_REGISTRY_TOKEN").ok()?;
    Some(RegistryAuth { username, password, server_address: None })
}
