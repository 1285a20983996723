//! Docker image building and pushing

use std::path::Path;

use bollard::auth::DockerCredentials;
use bollard::image::{BuildImageOptions, PushImageOptions, TagImageOptions};
use futures::StreamExt;
use tar::Builder;
use tracing::{debug, info};

use crate::error::{DockerError, Result};
use crate::types::{ImageBuildRequest, RegistryAuth};

/// Docker image builder
pub struct ImageBuilder<'a> {
    client: &'a bollard::Docker,
    auth: Option<&'a RegistryAuth>,
}

impl<'a> ImageBuilder<'a> {
    /// Create a new image builder
    pub fn new(client: &'a bollard::Docker, auth: Option<&'a RegistryAuth>) -> Self {
        Self { client, auth }
    }

    /// Build the image for the requested platform, tag it and optionally
    /// push every tag.
    pub async fn build(&self, request: &ImageBuildRequest) -> Result<()> {
        let primary_tag = request
            .tags
            .first()
            .ok_or_else(|| DockerError::BuildFailed {
                reason: "At least one tag is required".to_string(),
            })?
            .clone();

        info!("Building image {} for {}", primary_tag, request.platform);

        let tar_data = archive_context(&request.context, &request.dockerfile)?;

        let options = BuildImageOptions {
            t: primary_tag.clone(),
            dockerfile: dockerfile_in_context(&request.context, &request.dockerfile),
            platform: request.platform.clone(),
            rm: true,
            ..Default::default()
        };

        let mut stream = self
            .client
            .build_image(options, None, Some(tar_data.into()));

        while let Some(progress) = stream.next().await {
            match progress {
                Ok(output) => {
                    if let Some(line) = output.stream {
                        debug!("Build output: {}", line.trim());
                    }
                    if let Some(error) = output.error {
                        return Err(DockerError::BuildFailed { reason: error });
                    }
                }
                Err(e) => {
                    return Err(DockerError::BuildFailed { reason: e.to_string() });
                }
            }
        }

        // Apply the remaining tags to the built image
        for tag in request.tags.iter().skip(1) {
            let (repo, tag_part) = split_reference(tag);
            self.client
                .tag_image(
                    &primary_tag,
                    Some(TagImageOptions { repo: repo.as_str(), tag: tag_part.as_str() }),
                )
                .await
                .map_err(DockerError::Client)?;
        }

        if request.push {
            for tag in &request.tags {
                self.push(tag).await?;
            }
        }

        info!("Successfully built image: {}", primary_tag);
        Ok(())
    }

    /// Push one full reference to its registry.
    pub async fn push(&self, reference: &str) -> Result<()> {
        info!("Pushing image: {}", reference);

        let (repo, tag) = split_reference(reference);
        let credentials = self.auth.map(|auth| DockerCredentials {
            username: Some(auth.username.clone()),
            password: Some(auth.password.clone()),
            serveraddress: auth.server_address.clone(),
            ..Default::default()
        });

        let options = PushImageOptions { tag: tag.as_str() };
        let mut stream = self.client.push_image(&repo, Some(options), credentials);

        while let Some(progress) = stream.next().await {
            match progress {
                Ok(output) => {
                    if let Some(status) = output.status {
                        debug!("Push status: {}", status);
                    }
                    if let Some(error) = output.error {
                        return Err(DockerError::PushFailed {
                            reference: reference.to_string(),
                            reason: error,
                        });
                    }
                }
                Err(e) => {
                    return Err(DockerError::PushFailed {
                        reference: reference.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("Successfully pushed image: {}", reference);
        Ok(())
    }
}

/// Archive the build context directory, making sure the Dockerfile is part
/// of the archive even when it lives outside the context.
fn archive_context(context: &Path, dockerfile: &Path) -> Result<Vec<u8>> {
    if !context.is_dir() {
        return Err(DockerError::InvalidContext {
            path: context.display().to_string(),
            reason: "context is not a directory".to_string(),
        });
    }

    let mut tar_data = Vec::new();
    {
        let mut builder = Builder::new(&mut tar_data);
        builder.append_dir_all(".", context)?;

        if dockerfile.strip_prefix(context).is_err() {
            let mut file = std::fs::File::open(dockerfile)?;
            builder.append_file("Dockerfile", &mut file)?;
        }

        builder.finish()?;
    }
    Ok(tar_data)
}

/// Dockerfile path as seen inside the context archive.
fn dockerfile_in_context(context: &Path, dockerfile: &Path) -> String {
    dockerfile
        .strip_prefix(context)
        .map(|rel| rel.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "Dockerfile".to_string())
}

/// Split `registry/repository:tag` into repository and tag parts.
fn split_reference(reference: &str) -> (String, String) {
    match reference.rsplit_once(':') {
        // Guard against the colon of a registry port, e.g. `host:5000/app`.
        Some((repo, tag)) if !tag.contains('/') => (repo.to_string(), tag.to_string()),
        _ => (reference.to_string(), "latest".to_string()),
    }
}
