//! Host detection and platform tables
//!
//! Platforms and architectures use the identifiers found in interpreter
//! download names (`linux`, `darwin`, `win32`; `x64`, `arm64`, `ia32`, ...).
//! Each runtime kind describes its artifacts with a [`PlatformTable`]: a list
//! of supported platforms, each with the exact architecture aliases it
//! recognizes and the architecture it falls back to.

use serde::Serialize;
use std::fmt;
use tinyrt_core::{EnvOverrides, Result, RuntimeConfig, RuntimeError, RuntimeKind};

/// Platform identifier of the Windows family
pub const WINDOWS: &str = "win32";

/// Platform of the running process
pub fn host_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => WINDOWS,
        other => other,
    }
}

/// CPU architecture of the running process
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        "powerpc64" => "ppc64",
        other => other,
    }
}

pub fn is_windows_family(platform: &str) -> bool {
    platform == WINDOWS
}

/// Platform and architecture an artifact is selected for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub platform: String,
    pub arch: String,
}

impl Target {
    pub fn new(platform: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            arch: arch.into(),
        }
    }

    pub fn host() -> Self {
        Self::new(host_platform(), host_arch())
    }

    /// Explicit configuration first, then environment overrides, then the host
    pub fn resolve(config: &RuntimeConfig, env: &EnvOverrides) -> Self {
        let platform = config
            .platform
            .clone()
            .or_else(|| env.target_platform.clone())
            .unwrap_or_else(|| host_platform().to_string());
        let arch = config
            .arch
            .clone()
            .or_else(|| env.target_arch.clone())
            .unwrap_or_else(|| host_arch().to_string());

        Self { platform, arch }
    }

    pub fn is_windows(&self) -> bool {
        is_windows_family(&self.platform)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.platform, self.arch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveKind {
    TarGz,
    Zip,
}

impl ArchiveKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveKind::TarGz => "tar.gz",
            ArchiveKind::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How a runtime kind packages its distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchivePolicy {
    /// zip on the Windows family, gzip tar everywhere else
    ByPlatform,
    /// One archive kind regardless of platform
    Always(ArchiveKind),
}

impl ArchivePolicy {
    pub fn archive_for(&self, platform: &str) -> ArchiveKind {
        match self {
            ArchivePolicy::Always(kind) => *kind,
            ArchivePolicy::ByPlatform if is_windows_family(platform) => ArchiveKind::Zip,
            ArchivePolicy::ByPlatform => ArchiveKind::TarGz,
        }
    }
}

/// Supported platform and its recognized architectures
#[derive(Debug)]
pub struct PlatformRow {
    pub platform: &'static str,
    /// OS part of the platform token (e.g. `win` for `win32`)
    pub os_token: &'static str,
    /// Exact-match aliases mapped to canonical architecture tokens
    pub aliases: &'static [(&'static str, &'static str)],
    /// Token used for any architecture not listed in `aliases`
    pub default_arch: &'static str,
}

impl PlatformRow {
    pub fn arch_token(&self, arch: &str) -> &'static str {
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == arch)
            .map(|(_, token)| *token)
            .unwrap_or(self.default_arch)
    }
}

/// Canonical `<os>-<arch>` identifier selecting an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformToken {
    pub os: &'static str,
    pub arch: &'static str,
}

impl fmt::Display for PlatformToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Declarative artifact naming policy for one runtime kind
#[derive(Debug)]
pub struct PlatformTable {
    pub kind: RuntimeKind,
    pub rows: &'static [PlatformRow],
    pub archive: ArchivePolicy,
}

impl PlatformTable {
    pub fn row(&self, platform: &str) -> Option<&PlatformRow> {
        self.rows.iter().find(|row| row.platform == platform)
    }

    /// Looks up the token for `target`
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedPlatform` when the platform has no row. Unknown
    /// architectures on a supported platform use the row's default.
    pub fn platform_token(&self, target: &Target) -> Result<PlatformToken> {
        let row = self
            .row(&target.platform)
            .ok_or_else(|| RuntimeError::UnsupportedPlatform {
                kind: self.kind,
                platform: target.platform.clone(),
                arch: target.arch.clone(),
            })?;

        Ok(PlatformToken {
            os: row.os_token,
            arch: row.arch_token(&target.arch),
        })
    }

    pub fn archive_for(&self, target: &Target) -> ArchiveKind {
        self.archive.archive_for(&target.platform)
    }
}
