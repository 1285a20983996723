//! Version-control surface
//!
//! The pipeline reads the triggering revision's diff and message, and writes
//! one commit per redistribution run. Git is driven through the system
//! binary; a no-op commit is a success, not a failure.

use std::path::Path;

use async_trait::async_trait;
use fankai_release_core::ChangeSet;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ReleaseError, Result};

/// Result of committing the deploy tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new revision was created
    Committed(String),
    /// The tree was unchanged from the prior revision
    NothingToCommit,
}

/// Version-control surface trait
#[async_trait]
pub trait VcsSurface: Send + Sync {
    /// Paths added or modified in the given revision.
    async fn changed_files(&self, repo: &Path, revision: &str) -> Result<ChangeSet>;

    /// Full commit message of the given revision.
    async fn commit_message(&self, repo: &Path, revision: &str) -> Result<String>;

    /// Stage everything and commit with the given message.
    async fn commit_all(&self, repo: &Path, message: &str) -> Result<CommitOutcome>;
}

/// System-git implementation
pub struct GitCli;

impl GitCli {
    async fn run(&self, repo: &Path, args: &[&str]) -> Result<std::process::Output> {
        let output = Command::new("git")
            .current_dir(repo)
            .args(args)
            .output()
            .await?;
        debug!("git {:?} exited with {:?}", args, output.status.code());
        Ok(output)
    }

    async fn run_checked(&self, repo: &Path, args: &[&str]) -> Result<String> {
        let output = self.run(repo, args).await?;
        if !output.status.success() {
            return Err(ReleaseError::vcs(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VcsSurface for GitCli {
    async fn changed_files(&self, repo: &Path, revision: &str) -> Result<ChangeSet> {
        let stdout = self
            .run_checked(
                repo,
                &[
                    "diff-tree",
                    "--no-commit-id",
                    "--name-only",
                    "--diff-filter=AM",
                    "-r",
                    revision,
                ],
            )
            .await?;

        let paths = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        Ok(ChangeSet::new(paths))
    }

    async fn commit_message(&self, repo: &Path, revision: &str) -> Result<String> {
        let stdout = self
            .run_checked(repo, &["log", "-1", "--format=%B", revision])
            .await?;
        Ok(stdout.trim_end().to_string())
    }

    async fn commit_all(&self, repo: &Path, message: &str) -> Result<CommitOutcome> {
        self.run_checked(repo, &["add", "-A"]).await?;

        // Exit code 0 means the index matches HEAD: nothing to commit.
        let diff = self.run(repo, &["diff", "--cached", "--quiet"]).await?;
        match diff.status.code() {
            Some(0) => {
                info!("Deploy tree unchanged, skipping commit");
                return Ok(CommitOutcome::NothingToCommit);
            }
            Some(1) => {}
            _ => {
                return Err(ReleaseError::vcs(format!(
                    "git diff --cached failed: {}",
                    String::from_utf8_lossy(&diff.stderr).trim()
                )));
            }
        }

        self.run_checked(repo, &["commit", "-m", message]).await?;
        let sha = self.run_checked(repo, &["rev-parse", "HEAD"]).await?;
        let sha = sha.trim().to_string();

        info!("Committed deploy tree as {}", sha);
        Ok(CommitOutcome::Committed(sha))
    }
}
