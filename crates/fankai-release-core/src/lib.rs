//! Core types for the Fankai release pipeline
//!
//! This crate provides the pure domain model: target platforms, the
//! changed-file selector, the build matrix and per-task packaging options.
//! Nothing here performs I/O; everything is testable without an execution
//! environment.

pub mod arch;
pub mod changes;
pub mod error;
pub mod matrix;
pub mod options;
pub mod platform;

pub use arch::Architecture;
pub use changes::{select_scripts, ChangeSet, SourceScript};
pub use error::{Error, Result};
pub use matrix::{build_matrix, BuildTask};
pub use options::{OptionValue, PackagingDefaults, PackagingOptions, SERVICE_SCRIPT};
pub use platform::Platform;
