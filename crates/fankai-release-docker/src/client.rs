//! Docker client wrapper

use std::time::Duration;

use async_trait::async_trait;
use bollard::Docker;

use crate::error::{DockerError, Result};
use crate::image::ImageBuilder;
use crate::manifest::ManifestCli;
use crate::service::ImageServiceTrait;
use crate::types::{ImageBuildRequest, ManifestList, RegistryAuth};

/// Docker service configuration
pub struct DockerServiceConfig {
    /// Socket path (None for default)
    pub socket_path: Option<String>,
    /// Operation timeout
    pub timeout: Duration,
    /// Registry credentials for pushes
    pub auth: Option<RegistryAuth>,
}

impl Default for DockerServiceConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            timeout: Duration::from_secs(600),
            auth: None,
        }
    }
}

/// High-level Docker service wrapper
pub struct DockerService {
    client: Docker,
    config: DockerServiceConfig,
}

impl DockerService {
    /// Create a new Docker service
    pub async fn new(config: DockerServiceConfig) -> Result<Self> {
        let client = match &config.socket_path {
            Some(path) => Docker::connect_with_socket(path, 120, bollard::API_DEFAULT_VERSION),
            None => Docker::connect_with_local_defaults(),
        }
        .map_err(DockerError::Client)?;

        // Test connection
        client.ping().await.map_err(DockerError::Client)?;

        Ok(Self { client, config })
    }

    /// Get the underlying Docker client
    pub fn client(&self) -> &Docker {
        &self.client
    }
}

#[async_trait]
impl ImageServiceTrait for DockerService {
    async fn build_image(&self, request: &ImageBuildRequest) -> Result<()> {
        let builder = ImageBuilder::new(&self.client, self.config.auth.as_ref());
        builder.build(request).await
    }

    async fn create_manifest(&self, list: &ManifestList) -> Result<()> {
        ManifestCli::create(list).await
    }

    async fn push_manifest(&self, list: &ManifestList) -> Result<()> {
        ManifestCli::push(list).await
    }
}
