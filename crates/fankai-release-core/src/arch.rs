//! CPU architecture detection and reduction
//!
//! The packaging service understands exactly two architectures. Every raw
//! identifier a probe can report is reduced to one of them; identifiers not
//! recognized as 64-bit ARM fall back to the x86 bucket.

use std::env;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Canonical architecture bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    X64,
    Arm64,
}

impl Architecture {
    /// Reduce a raw machine identifier to a canonical bucket. The ARM-64 raw
    /// spellings (`arm64` from macOS and CI runners, `aarch64` from uname)
    /// map to [`Architecture::Arm64`]; everything else, including unknown
    /// future identifiers, maps to [`Architecture::X64`].
    pub fn from_raw(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("arm64") || raw.eq_ignore_ascii_case("aarch64") {
            Architecture::Arm64
        } else {
            Architecture::X64
        }
    }

    /// One-shot probe of the build host, cached for the process lifetime.
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Architecture> = OnceLock::new();
        *DETECTED.get_or_init(|| Architecture::from_raw(env::consts::ARCH))
    }

    /// Identifier passed to the packaging service.
    pub fn packager_id(&self) -> &'static str {
        match self {
            Architecture::X64 => "x64",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Platform string understood by the container build engine.
    pub fn docker_platform(&self) -> &'static str {
        match self {
            Architecture::X64 => "linux/amd64",
            Architecture::Arm64 => "linux/arm64",
        }
    }

    /// Suffix appended to architecture-specific image tags.
    pub fn tag_suffix(&self) -> &'static str {
        match self {
            Architecture::X64 => "amd64",
            Architecture::Arm64 => "arm64",
        }
    }
}
