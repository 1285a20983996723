//! Container image pipeline
//!
//! Builds one image per architecture from the fixed build context, pushes
//! architecture-suffixed tags to every configured registry, then assembles
//! same-tag images into one manifest list per tag per registry. Manifest
//! assembly for a tag begins only when every member push for that tag
//! succeeded; a partial multi-architecture manifest is never published.

use std::collections::HashSet;
use std::sync::Arc;

use fankai_release_config::DockerConfig;
use fankai_release_core::Architecture;
use fankai_release_docker::{ImageBuildRequest, ImageRef, ImageServiceTrait, ManifestList};
use futures::future::join_all;
use tracing::{info, warn};

use crate::error::{ReleaseError, Result};

/// Architectures every image is built for
pub const IMAGE_ARCHITECTURES: [Architecture; 2] = [Architecture::X64, Architecture::Arm64];

/// Manifest state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestState {
    /// Waiting on member images
    Pending,
    /// A member build failed; the manifest is never assembled
    Blocked,
    /// Created locally from all members
    Assembled,
    /// Pushed to the registry
    Pushed,
}

/// Outcome for one (registry, tag) manifest
#[derive(Debug, Clone)]
pub struct ManifestOutcome {
    pub list: ManifestList,
    pub state: ManifestState,
    pub error: Option<String>,
}

/// Outcome of one image pipeline run
#[derive(Debug, Clone, Default)]
pub struct ImageReport {
    /// Per-architecture build failures
    pub arch_failures: Vec<(Architecture, String)>,
    /// Per-manifest outcomes
    pub manifests: Vec<ManifestOutcome>,
}

impl ImageReport {
    pub fn is_success(&self) -> bool {
        self.arch_failures.is_empty()
            && self
                .manifests
                .iter()
                .all(|m| m.state == ManifestState::Pushed)
    }
}

/// Image pipeline driver
pub struct ImagePipeline {
    config: DockerConfig,
    service: Arc<dyn ImageServiceTrait>,
}

impl ImagePipeline {
    /// Create a new image pipeline
    pub fn new(config: DockerConfig, service: Arc<dyn ImageServiceTrait>) -> Self {
        Self { config, service }
    }

    /// The two tags every build publishes: the configured default tag and
    /// the immutable revision tag.
    fn tags(&self, revision_tag: &str) -> Vec<String> {
        vec![self.config.default_tag.clone(), revision_tag.to_string()]
    }

    /// Run the image pipeline for one revision
    pub async fn run(&self, revision_tag: &str) -> Result<ImageReport> {
        let tags = self.tags(revision_tag);
        let mut report = ImageReport::default();

        // Fan-out: one isolated build per architecture, each pushing its
        // architecture-suffixed tag to every registry.
        let builds = IMAGE_ARCHITECTURES.iter().map(|arch| {
            let service = Arc::clone(&self.service);
            let request = ImageBuildRequest {
                context: self.config.context.clone(),
                dockerfile: self.config.dockerfile.clone(),
                platform: arch.docker_platform().to_string(),
                push: true,
                tags: self.arch_references(*arch, &tags),
            };
            async move { (*arch, service.build_image(&request).await) }
        });

        let mut pushed: HashSet<Architecture> = HashSet::new();
        for (arch, result) in join_all(builds).await {
            match result {
                Ok(()) => {
                    pushed.insert(arch);
                }
                Err(e) => {
                    warn!("Image build for {} failed: {}", arch.docker_platform(), e);
                    report.arch_failures.push((arch, e.to_string()));
                }
            }
        }

        // Fan-in: one manifest list per (registry, tag), gated on every
        // member having been pushed.
        let all_pushed = IMAGE_ARCHITECTURES.iter().all(|arch| pushed.contains(arch));
        for registry in &self.config.registries {
            for tag in &tags {
                let list = self.manifest_list(registry, tag);
                let outcome = if all_pushed {
                    self.publish_manifest(list).await
                } else {
                    warn!(
                        "Manifest {} blocked: missing member images",
                        list.reference()
                    );
                    ManifestOutcome {
                        list,
                        state: ManifestState::Blocked,
                        error: Some("member image build failed".to_string()),
                    }
                };
                report.manifests.push(outcome);
            }
        }

        if report.is_success() {
            info!(
                "Image pipeline complete: {} manifests pushed",
                report.manifests.len()
            );
            Ok(report)
        } else {
            Err(ReleaseError::images(describe_failures(&report)))
        }
    }

    async fn publish_manifest(&self, list: ManifestList) -> ManifestOutcome {
        if let Err(e) = self.service.create_manifest(&list).await {
            return ManifestOutcome {
                list,
                state: ManifestState::Pending,
                error: Some(e.to_string()),
            };
        }

        match self.service.push_manifest(&list).await {
            Ok(()) => {
                info!("Pushed manifest {}", list.reference());
                ManifestOutcome { list, state: ManifestState::Pushed, error: None }
            }
            Err(e) => ManifestOutcome {
                list,
                state: ManifestState::Assembled,
                error: Some(e.to_string()),
            },
        }
    }

    /// Full references one architecture build pushes.
    fn arch_references(&self, arch: Architecture, tags: &[String]) -> Vec<String> {
        self.config
            .registries
            .iter()
            .flat_map(|registry| {
                tags.iter().map(move |tag| {
                    ImageRef {
                        registry: registry.clone(),
                        repository: self.config.repository.clone(),
                        tag: tag.clone(),
                        architecture: arch,
                    }
                    .reference()
                })
            })
            .collect()
    }

    fn manifest_list(&self, registry: &str, tag: &str) -> ManifestList {
        ManifestList {
            registry: registry.to_string(),
            repository: self.config.repository.clone(),
            tag: tag.to_string(),
            members: IMAGE_ARCHITECTURES
                .iter()
                .map(|arch| ImageRef {
                    registry: registry.to_string(),
                    repository: self.config.repository.clone(),
                    tag: tag.to_string(),
                    architecture: *arch,
                })
                .collect(),
        }
    }
}

fn describe_failures(report: &ImageReport) -> String {
    let mut parts = Vec::new();
    for (arch, error) in &report.arch_failures {
        parts.push(format!("{} build: {error}", arch.docker_platform()));
    }
    for manifest in &report.manifests {
        if let Some(error) = &manifest.error {
            parts.push(format!("{}: {error}", manifest.list.reference()));
        }
    }
    parts.join("; ")
}
