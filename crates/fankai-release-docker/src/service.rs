//! Image service trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ImageBuildRequest, ManifestList};

/// Service boundary for the container build engine and the manifest tool.
/// The image pipeline talks only to this trait; tests substitute mocks.
#[async_trait]
pub trait ImageServiceTrait: Send + Sync {
    /// Build an image for one platform, apply every requested tag and, when
    /// `request.push` is set, push each tag.
    async fn build_image(&self, request: &ImageBuildRequest) -> Result<()>;

    /// Create the architecture-spanning manifest list locally. Fails if any
    /// member image is missing from the registry.
    async fn create_manifest(&self, list: &ManifestList) -> Result<()>;

    /// Push a previously created manifest list.
    async fn push_manifest(&self, list: &ManifestList) -> Result<()>;
}
