//! Build orchestration for the Fankai release pipeline
//!
//! This crate coordinates the two pipelines: the native-binary release
//! (change selection, build matrix, parallel packaging fan-out, artifact
//! redistribution, deploy commit, completion signals) and the
//! multi-architecture container image release.

pub mod context;
pub mod error;
pub mod executor;
pub mod images;
pub mod notify;
pub mod orchestrator;
pub mod packager;
pub mod redistribute;
pub mod vcs;

pub use context::{PipelineState, ReleaseContext, RunStats, TaskOutcome};
pub use error::{ReleaseError, Result};
pub use executor::{ExecutorConfig, TaskArtifact, TaskExecutor};
pub use images::{ImagePipeline, ImageReport, ManifestOutcome, ManifestState, IMAGE_ARCHITECTURES};
pub use notify::{CompletionSurface, HttpCompletionSurface};
pub use orchestrator::{ReleasePipeline, RunReport};
pub use packager::{PackageRequest, PackagerService, PyInstaller};
pub use redistribute::{ArtifactRedistributor, RedistributionReport};
pub use vcs::{CommitOutcome, GitCli, VcsSurface};
