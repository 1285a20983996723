//! Container image integration for the Fankai release pipeline
//!
//! This crate builds and pushes architecture-specific images and assembles
//! them into multi-architecture manifest lists.

pub mod client;
pub mod error;
pub mod image;
pub mod manifest;
pub mod service;
pub mod types;

pub use client::{DockerService, DockerServiceConfig};
pub use error::{DockerError, Result};
pub use image::ImageBuilder;
pub use manifest::ManifestCli;
pub use service::ImageServiceTrait;
pub use types::{ImageBuildRequest, ImageRef, ManifestList, RegistryAuth};
