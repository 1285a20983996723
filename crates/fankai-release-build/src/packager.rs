//! Packaging service boundary
//!
//! The executable packager is an external collaborator consumed through its
//! input/output contract: entry file, option mapping, target architecture
//! and a dependency manifest in; a named single-file binary out. The
//! production implementation shells out to PyInstaller.

use std::path::PathBuf;

use async_trait::async_trait;
use fankai_release_core::{Architecture, OptionValue, PackagingOptions};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ReleaseError, Result};

/// Inputs to one packaging invocation
#[derive(Debug, Clone)]
pub struct PackageRequest {
    /// Entry-point script
    pub entry_file: PathBuf,
    /// Resolved per-task options
    pub options: PackagingOptions,
    /// Canonical build architecture
    pub architecture: Architecture,
    /// Fixed dependency manifest installed before packaging
    pub dependency_manifest: PathBuf,
    /// Isolated directory the artifact is materialized into
    pub dist_dir: PathBuf,
}

/// Packaging service trait
#[async_trait]
pub trait PackagerService: Send + Sync {
    /// Package one entry script and return the produced binary path.
    async fn package(&self, request: &PackageRequest) -> Result<PathBuf>;
}

/// PyInstaller-backed packaging service
pub struct PyInstaller {
    python: String,
}

impl PyInstaller {
    pub fn new() -> Self {
        Self { python: "python".to_string() }
    }

    /// Use a specific interpreter, e.g. `python3`.
    pub fn with_python(python: impl Into<String>) -> Self {
        Self { python: python.into() }
    }

    async fn install_dependencies(&self, request: &PackageRequest) -> Result<()> {
        if !request.dependency_manifest.exists() {
            debug!(
                "Dependency manifest {} not found, skipping install",
                request.dependency_manifest.display()
            );
            return Ok(());
        }

        let output = Command::new(&self.python)
            .args(["-m", "pip", "install", "--quiet", "-r"])
            .arg(&request.dependency_manifest)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ReleaseError::packaging(
                &request.options.output_name,
                format!(
                    "dependency install failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Ok(())
    }
}

impl Default for PyInstaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackagerService for PyInstaller {
    async fn package(&self, request: &PackageRequest) -> Result<PathBuf> {
        self.install_dependencies(request).await?;

        info!(
            "Packaging {} ({})",
            request.options.output_name,
            request.architecture.packager_id()
        );

        let mut command = Command::new(&self.python);
        command.args(["-m", "PyInstaller", "--noconfirm", "--onefile", "--clean"]);

        for (key, value) in request.options.to_option_map() {
            match (key.as_str(), value) {
                ("name", OptionValue::Text(name)) => {
                    command.arg("--name").arg(name);
                }
                ("windowed", OptionValue::Flag(true)) => {
                    command.arg("--windowed");
                }
                ("windowed", OptionValue::Flag(false)) => {
                    command.arg("--console");
                }
                ("icon", OptionValue::Text(icon)) => {
                    command.arg("--icon").arg(icon);
                }
                ("upx-dir", OptionValue::Text(dir)) => {
                    command.arg("--upx-dir").arg(dir);
                }
                ("bundled-modules", OptionValue::Text(modules)) => {
                    for module in modules.split(',').filter(|m| !m.is_empty()) {
                        command.arg("--hidden-import").arg(module);
                    }
                }
                _ => {}
            }
        }

        // The packager only understands target architectures on macOS.
        if cfg!(target_os = "macos") {
            let target = match request.architecture {
                Architecture::X64 => "x86_64",
                Architecture::Arm64 => "arm64",
            };
            command.arg("--target-architecture").arg(target);
        }

        command.arg("--distpath").arg(&request.dist_dir);
        command.arg(&request.entry_file);

        let output = command.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::packaging(
                &request.options.output_name,
                stderr.lines().rev().take(5).collect::<Vec<_>>().join(" | "),
            ));
        }

        let binary = request.dist_dir.join(&request.options.output_name);
        debug!("Packaged binary at {}", binary.display());
        Ok(binary)
    }
}
