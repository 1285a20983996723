//! Init command implementation

use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result};
use tracing::info;

const CONFIG_TEMPLATE: &str = r#"# Fankai release pipeline configuration
source_repo: .
deploy_repo: ../fankai_utilitaire
source_dir: src
staging_dir: dist
app_name: Fankai
requirements: requirements.txt

packaging:
  upx_root: dev/upx
  icon: dev/fankai.ico
  bundled_modules: []

docker:
  context: docker
  dockerfile: docker/Dockerfile
  repository: nackophilz/fankai_utilitaire
  registries:
    - docker.io
    - ghcr.io
  default_tag: latest

notify:
  cleanup_workflow: purge-artifacts.yml
  dispatch_repo: Nackophilz/fankai_utilitaire
  webhook_url: ${FANKAI_WEBHOOK_URL}
"#;

/// Init command implementation
pub struct InitCommand {
    output: PathBuf,
    force: bool,
}

impl InitCommand {
    pub fn new(output: PathBuf, force: bool) -> Self {
        Self { output, force }
    }

    pub async fn execute(&self) -> Result<()> {
        if self.output.exists() && !self.force {
            return Err(eyre!(
                "Configuration file {} already exists (use --force to overwrite)",
                self.output.display()
            ));
        }

        tokio::fs::write(&self.output, CONFIG_TEMPLATE).await?;

        info!("Wrote configuration template to {}", self.output.display());
        println!("✓ Created {}", self.output.display());

        Ok(())
    }
}
