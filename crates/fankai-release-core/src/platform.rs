//! Target platform definitions
//!
//! The release pipeline builds for a fixed set of five platform/architecture
//! combinations. Each platform carries the identifiers the rest of the
//! pipeline needs: the runner label used in artifact names, the canonical
//! deploy directory in the distribution repository, and the optional mirror
//! directory feeding the container-image build context.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five fixed build targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    LinuxX64,
    WindowsX64,
    MacosX64,
    MacosArm64,
    LinuxArm64,
}

/// Substring rules for classifying artifact directory names back into
/// platforms. ARM-qualified labels come before their generic prefixes so
/// that e.g. `Fankai-ubicloud-standard-2-arm` is never claimed by the
/// `ubicloud` rule.
const CLASSIFY_RULES: [(&str, Platform); 10] = [
    ("ubicloud-standard-2-arm", Platform::LinuxArm64),
    ("linux-arm64", Platform::LinuxArm64),
    ("linux_arm", Platform::LinuxArm64),
    ("macos-arm64", Platform::MacosArm64),
    ("macos-latest", Platform::MacosArm64),
    ("ubicloud", Platform::LinuxX64),
    ("linux", Platform::LinuxX64),
    ("windows", Platform::WindowsX64),
    ("macos-13", Platform::MacosX64),
    ("macos", Platform::MacosX64),
];

impl Platform {
    /// All five targets, in matrix order.
    pub const ALL: [Platform; 5] = [
        Platform::LinuxX64,
        Platform::WindowsX64,
        Platform::MacosX64,
        Platform::MacosArm64,
        Platform::LinuxArm64,
    ];

    /// Canonical platform identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Platform::LinuxX64 => "linux-x64",
            Platform::WindowsX64 => "windows-x64",
            Platform::MacosX64 => "macos-x64",
            Platform::MacosArm64 => "macos-arm64",
            Platform::LinuxArm64 => "linux-arm64",
        }
    }

    /// Runner label used as the artifact-name suffix. These are load-bearing
    /// for compatibility with previously published artifact names.
    pub fn runner_label(&self) -> &'static str {
        match self {
            Platform::LinuxX64 => "ubicloud",
            Platform::WindowsX64 => "windows-latest",
            Platform::MacosX64 => "macos-13",
            Platform::MacosArm64 => "macos-latest",
            Platform::LinuxArm64 => "ubicloud-standard-2-arm",
        }
    }

    /// Destination directory in the distribution repository.
    pub fn deploy_dir(&self) -> &'static str {
        match self {
            Platform::LinuxX64 => "setup_linux",
            Platform::WindowsX64 => "setup",
            Platform::MacosX64 => "setup_macos",
            Platform::MacosArm64 => "setup_macos_arm",
            Platform::LinuxArm64 => "setup_linux_arm",
        }
    }

    /// Mirror directory feeding the container-image build context. Only the
    /// two Linux targets ship into images.
    pub fn image_mirror_dir(&self) -> Option<&'static str> {
        match self {
            Platform::LinuxX64 => Some("docker/x86"),
            Platform::LinuxArm64 => Some("docker/arm"),
            _ => None,
        }
    }

    /// Executable filename suffix on this platform.
    pub fn executable_suffix(&self) -> &'static str {
        match self {
            Platform::WindowsX64 => ".exe",
            _ => "",
        }
    }

    /// Classify an artifact directory name into a platform by substring,
    /// most specific rule first. Names matching no rule yield `None` and are
    /// skipped by the redistributor.
    pub fn classify(dir_name: &str) -> Option<Platform> {
        let name = dir_name.to_ascii_lowercase();
        CLASSIFY_RULES
            .iter()
            .find(|(needle, _)| name.contains(needle))
            .map(|(_, platform)| *platform)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
