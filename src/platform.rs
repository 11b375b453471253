//! Maps host OS/arch identifiers to the release asset naming scheme.

use crate::error::LaunchError;
use std::fmt;

/// Operating systems with published release binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Darwin,
    Linux,
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::Darwin => write!(f, "darwin"),
            Os::Linux => write!(f, "linux"),
            Os::Windows => write!(f, "windows"),
        }
    }
}

/// CPU architectures with published release binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::Amd64 => write!(f, "amd64"),
            Arch::Arm64 => write!(f, "arm64"),
        }
    }
}

/// Normalized (OS, architecture) pair used to select the correct asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformKey {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformKey {
    /// Resolves host identifiers against the fixed lookup table.
    ///
    /// Accepts the spellings reported by the Rust standard library
    /// ("macos", "x86_64", "aarch64") as well as the Go/Node style names
    /// the release assets themselves use ("darwin", "amd64", "x64").
    pub fn resolve(os: &str, arch: &str) -> Result<Self, LaunchError> {
        let unsupported = || LaunchError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };

        let os_key = match os {
            "macos" | "darwin" => Os::Darwin,
            "linux" => Os::Linux,
            "windows" | "win32" => Os::Windows,
            _ => return Err(unsupported()),
        };

        let arch_key = match arch {
            "x86_64" | "amd64" | "x64" => Arch::Amd64,
            "aarch64" | "arm64" => Arch::Arm64,
            _ => return Err(unsupported()),
        };

        Ok(Self {
            os: os_key,
            arch: arch_key,
        })
    }

    /// Resolves the platform the launcher itself is running on.
    pub fn detect() -> Result<Self, LaunchError> {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH)
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
