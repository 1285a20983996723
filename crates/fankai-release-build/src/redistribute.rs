//! Artifact redistribution
//!
//! Runs once, after every build task has reported in. Each artifact
//! directory is classified by platform and merged into the persistent
//! deploy tree: copy, never move, overwriting same-named prior contents so
//! that re-running over identical inputs yields an identical tree. The two
//! Linux platforms additionally mirror the primary executable into the
//! image-build input directories.
//!
//! A single redistributor instance owns the deploy tree for the duration of
//! the run; its read-modify-commit sequence is never executed concurrently.

use std::fs;
use std::path::{Path, PathBuf};

use fankai_release_core::Platform;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{ReleaseError, Result};

/// What one redistribution run did
#[derive(Debug, Clone, Default)]
pub struct RedistributionReport {
    /// Artifact directories merged, with their classified platform
    pub merged: Vec<(String, Platform)>,
    /// Mirror files written for the image pipeline
    pub mirrored: Vec<PathBuf>,
    /// Directory names matching no known platform (diagnostic, non-fatal)
    pub skipped: Vec<String>,
}

impl RedistributionReport {
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty() && self.skipped.is_empty()
    }
}

/// Merges staged artifacts into the deploy tree
pub struct ArtifactRedistributor {
    deploy_repo: PathBuf,
    app_name: String,
}

impl ArtifactRedistributor {
    /// Create a new redistributor over the deploy repository
    pub fn new(deploy_repo: PathBuf, app_name: impl Into<String>) -> Self {
        Self { deploy_repo, app_name: app_name.into() }
    }

    /// Merge every artifact directory under `staging_root` into the deploy
    /// tree and remove the consumed directories.
    pub fn redistribute(&self, staging_root: &Path) -> Result<RedistributionReport> {
        info!("Redistributing artifacts from {}", staging_root.display());

        let mut report = RedistributionReport::default();

        // Deterministic order regardless of directory enumeration order.
        let mut artifact_dirs = Vec::new();
        for entry in fs::read_dir(staging_root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                artifact_dirs.push(entry.path());
            }
        }
        artifact_dirs.sort();

        for dir in artifact_dirs {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let Some(platform) = Platform::classify(&name) else {
                warn!("Skipping artifact directory with unknown platform: {}", name);
                report.skipped.push(name);
                continue;
            };

            let destination = self.deploy_repo.join(platform.deploy_dir());
            debug!("Merging {} into {}", name, destination.display());

            copy_tree(&dir, &destination).map_err(|e| {
                ReleaseError::redistribution(format!(
                    "failed to merge {name} into {}: {e}",
                    destination.display()
                ))
            })?;

            if let Some(mirror) = self.mirror_primary_executable(&dir, platform)? {
                report.mirrored.push(mirror);
            }

            fs::remove_dir_all(&dir).map_err(|e| {
                ReleaseError::redistribution(format!("failed to remove {name}: {e}"))
            })?;

            report.merged.push((name, platform));
        }

        info!(
            "Redistributed {} artifact directories ({} skipped)",
            report.merged.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Mirror the primary executable into the platform's image-build input
    /// directory, when the platform ships into images and the executable is
    /// present in the artifact directory.
    fn mirror_primary_executable(
        &self,
        artifact_dir: &Path,
        platform: Platform,
    ) -> Result<Option<PathBuf>> {
        let Some(mirror_dir) = platform.image_mirror_dir() else {
            return Ok(None);
        };

        let executable_name =
            format!("{}{}", self.app_name, platform.executable_suffix());
        let executable = artifact_dir.join(&executable_name);
        if !executable.is_file() {
            debug!(
                "No primary executable {} in {}, nothing to mirror",
                executable_name,
                artifact_dir.display()
            );
            return Ok(None);
        }

        let destination_dir = self.deploy_repo.join(mirror_dir);
        fs::create_dir_all(&destination_dir)?;

        let destination = destination_dir.join(&self.app_name);
        fs::copy(&executable, &destination).map_err(|e| {
            ReleaseError::redistribution(format!(
                "failed to mirror {} into {}: {e}",
                executable.display(),
                destination.display()
            ))
        })?;

        debug!("Mirrored {} -> {}", executable.display(), destination.display());
        Ok(Some(destination))
    }
}

/// Recursively copy `src` into `dst`, creating directories as needed and
/// overwriting existing files.
fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(std::io::Error::other)?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_tree_overwrites_existing_files() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a"), b"new").unwrap();
        fs::write(src.join("nested/b"), b"data").unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("a"), b"old").unwrap();

        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read(dst.join("a")).unwrap(), b"new");
        assert_eq!(fs::read(dst.join("nested/b")).unwrap(), b"data");
        // Source is untouched by the copy itself.
        assert!(src.join("a").exists());
    }
}
