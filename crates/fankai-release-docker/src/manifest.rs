//! Manifest list assembly
//!
//! Manifest lists are created and pushed through the `docker manifest` CLI;
//! the build engine API has no manifest surface. The tool is consumed as an
//! opaque service: nonzero exit means failure for that tag only.

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{DockerError, Result};
use crate::types::ManifestList;

/// `docker manifest` CLI wrapper
pub struct ManifestCli;

impl ManifestCli {
    /// Create (or amend) the manifest list from its member references.
    /// Fails if any member image is missing from the registry.
    pub async fn create(list: &ManifestList) -> Result<()> {
        let target = list.reference();
        info!("Creating manifest list {}", target);

        let mut command = Command::new("docker");
        command.args(["manifest", "create", "--amend", &target]);
        for member in &list.members {
            command.arg(member.reference());
        }

        run_manifest_command(command, &target).await
    }

    /// Push a previously created manifest list.
    pub async fn push(list: &ManifestList) -> Result<()> {
        let target = list.reference();
        info!("Pushing manifest list {}", target);

        let mut command = Command::new("docker");
        command.args(["manifest", "push", "--purge", &target]);

        run_manifest_command(command, &target).await
    }
}

async fn run_manifest_command(mut command: Command, reference: &str) -> Result<()> {
    let output = command.output().await?;

    debug!(
        "docker manifest exit status for {}: {:?}",
        reference,
        output.status.code()
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DockerError::ManifestFailed {
            reference: reference.to_string(),
            reason: stderr.trim().to_string(),
        });
    }

    Ok(())
}
