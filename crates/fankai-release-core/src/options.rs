//! Per-task packaging options
//!
//! Options are derived from the script's stem and the target platform, never
//! from ambient state. The only windowed build is the background service;
//! every other entry point is a console application.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::changes::SourceScript;
use crate::platform::Platform;

/// Stem of the entry script that is packaged in windowed mode.
pub const SERVICE_SCRIPT: &str = "Fankai-Service";

/// Project-level packaging inputs shared by every task, sourced from
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingDefaults {
    /// Root of the per-platform compression tool checkouts.
    pub upx_root: PathBuf,
    /// Application icon embedded into the executables.
    pub icon: PathBuf,
    /// Modules the packager must bundle explicitly.
    pub bundled_modules: Vec<String>,
}

impl Default for PackagingDefaults {
    fn default() -> Self {
        Self {
            upx_root: PathBuf::from("dev/upx"),
            icon: PathBuf::from("dev/fankai.ico"),
            bundled_modules: Vec::new(),
        }
    }
}

/// A single option value in the packager's option mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Text(String),
}

/// Fully resolved options for one build task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingOptions {
    pub output_name: String,
    pub windowed: bool,
    /// Compression tool directory; platforms without a supported tool carry
    /// `None` and the packager invocation omits the option.
    pub upx_dir: Option<PathBuf>,
    pub icon: PathBuf,
    pub bundled_modules: Vec<String>,
}

impl PackagingOptions {
    /// Derive the options for one `(script, platform)` pair.
    pub fn derive(
        script: &SourceScript,
        platform: Platform,
        defaults: &PackagingDefaults,
    ) -> Self {
        let output_name = script.output_name().to_string();
        Self {
            windowed: output_name == SERVICE_SCRIPT,
            upx_dir: upx_dir_for(platform, &defaults.upx_root),
            icon: defaults.icon.clone(),
            bundled_modules: defaults.bundled_modules.clone(),
            output_name,
        }
    }

    /// Render as the packaging service's option mapping. `BTreeMap` keeps
    /// the key order deterministic.
    pub fn to_option_map(&self) -> BTreeMap<String, OptionValue> {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), OptionValue::Text(self.output_name.clone()));
        map.insert("windowed".to_string(), OptionValue::Flag(self.windowed));
        map.insert(
            "icon".to_string(),
            OptionValue::Text(self.icon.to_string_lossy().into_owned()),
        );
        if let Some(dir) = &self.upx_dir {
            map.insert(
                "upx-dir".to_string(),
                OptionValue::Text(dir.to_string_lossy().into_owned()),
            );
        }
        if !self.bundled_modules.is_empty() {
            map.insert(
                "bundled-modules".to_string(),
                OptionValue::Text(self.bundled_modules.join(",")),
            );
        }
        map
    }
}

fn upx_dir_for(platform: Platform, upx_root: &Path) -> Option<PathBuf> {
    match platform {
        Platform::WindowsX64 => Some(upx_root.join("windows")),
        Platform::LinuxX64 => Some(upx_root.join("linux/x64")),
        Platform::LinuxArm64 => Some(upx_root.join("linux/arm64")),
        Platform::MacosX64 => Some(upx_root.join("macos")),
        // No supported compressor for Mach-O arm64.
        Platform::MacosArm64 => None,
    }
}
