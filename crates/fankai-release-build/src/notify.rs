//! Completion surface
//!
//! The pipeline ends with two outward signals: the artifact-retention
//! cleanup trigger and the terminal notification carrying the revision
//! identifier. Both are acknowledged deliveries; a failed send fails the
//! run instead of being dispatched best-effort.

use async_trait::async_trait;
use fankai_release_config::NotifyConfig;
use serde_json::json;
use tracing::info;

use crate::error::{ReleaseError, Result};

/// Completion surface trait
#[async_trait]
pub trait CompletionSurface: Send + Sync {
    /// Fire the downstream artifact-retention job by name.
    async fn trigger_cleanup(&self, workflow: &str) -> Result<()>;

    /// Deliver the terminal message for a finished revision.
    async fn announce(&self, revision: &str) -> Result<()>;
}

/// HTTP implementation: workflow dispatch for cleanup, webhook for the
/// terminal message.
pub struct HttpCompletionSurface {
    client: reqwest::Client,
    config: NotifyConfig,
    token: Option<String>,
}

impl HttpCompletionSurface {
    pub fn new(config: NotifyConfig, token: Option<String>) -> Self {
        Self { client: reqwest::Client::new(), config, token }
    }
}

#[async_trait]
impl CompletionSurface for HttpCompletionSurface {
    async fn trigger_cleanup(&self, workflow: &str) -> Result<()> {
        let url = format!(
            "https://api.github.com/repos/{}/actions/workflows/{}/dispatches",
            self.config.dispatch_repo, workflow
        );

        let mut request = self
            .client
            .post(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "fankai-release")
            .json(&json!({ "ref": "main" }));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ReleaseError::notification(format!("cleanup dispatch: {e}")))?;

        if !response.status().is_success() {
            return Err(ReleaseError::notification(format!(
                "cleanup dispatch for {workflow} returned {}",
                response.status()
            )));
        }

        info!("Cleanup workflow {} dispatched", workflow);
        Ok(())
    }

    async fn announce(&self, revision: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&json!({
                "content": format!("Fankai release {revision} published")
            }))
            .send()
            .await
            .map_err(|e| ReleaseError::notification(format!("terminal message: {e}")))?;

        if !response.status().is_success() {
            return Err(ReleaseError::notification(format!(
                "terminal message returned {}",
                response.status()
            )));
        }

        info!("Release {} announced", revision);
        Ok(())
    }
}
