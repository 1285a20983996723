//! Image pipeline types

use std::path::PathBuf;

use fankai_release_core::Architecture;
use serde::{Deserialize, Serialize};

/// One architecture-specific image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    pub registry: String,
    pub repository: String,
    /// Base tag; the pushed tag carries the architecture suffix.
    pub tag: String,
    pub architecture: Architecture,
}

impl ImageRef {
    /// Architecture-suffixed tag, e.g. `latest-arm64`.
    pub fn arch_tag(&self) -> String {
        format!("{}-{}", self.tag, self.architecture.tag_suffix())
    }

    /// Full pushable reference, e.g. `ghcr.io/acme/app:latest-arm64`.
    pub fn reference(&self) -> String {
        format!("{}/{}:{}", self.registry, self.repository, self.arch_tag())
    }
}

/// An architecture-spanning manifest list for one tag in one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestList {
    pub registry: String,
    pub repository: String,
    pub tag: String,
    pub members: Vec<ImageRef>,
}

impl ManifestList {
    /// The combined reference the list is published under.
    pub fn reference(&self) -> String {
        format!("{}/{}:{}", self.registry, self.repository, self.tag)
    }
}

/// Inputs to one container image build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBuildRequest {
    /// Build context directory
    pub context: PathBuf,
    /// Dockerfile path (inside or outside the context)
    pub dockerfile: PathBuf,
    /// Target platform, e.g. `linux/arm64`
    pub platform: String,
    /// Push the tags after a successful build
    pub push: bool,
    /// Full references to apply, e.g. `ghcr.io/acme/app:latest-arm64`
    pub tags: Vec<String>,
}

/// Docker registry credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryAuth {
    /// Username
    pub username: String,
    /// Password or access token
    pub password: String,
    /// Registry server URL
    pub server_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_ref_rendering() {
        let image = ImageRef {
            registry: "ghcr.io".to_string(),
            repository: "nackophilz/fankai_utilitaire".to_string(),
            tag: "latest".to_string(),
            architecture: Architecture::Arm64,
        };
        assert_eq!(image.arch_tag(), "latest-arm64");
        assert_eq!(image.reference(), "ghcr.io/nackophilz/fankai_utilitaire:latest-arm64");
    }

    #[test]
    fn manifest_reference_has_no_arch_suffix() {
        let list = ManifestList {
            registry: "docker.io".to_string(),
            repository: "nackophilz/fankai_utilitaire".to_string(),
            tag: "1a2b3c4".to_string(),
            members: Vec::new(),
        };
        assert_eq!(list.reference(), "docker.io/nackophilz/fankai_utilitaire:1a2b3c4");
    }
}
