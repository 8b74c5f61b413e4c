//! Artifact resolution
//!
//! Maps (kind, version, platform, architecture) to the archive to download.
//! Everything here is pure: no network or file-system access.
//!
//! | kind   | file name                                   | url                                  |
//! |--------|---------------------------------------------|--------------------------------------|
//! | node   | `node-<version>-<token>.<tar.gz\|zip>`      | `<mirror>/<version>/<file>`          |
//! | python | `python-<v>-<token>.tar.gz`                 | `<mirror>/<v>/<file>`                |
//! | python | `python-<v>-embed-<arch>.zip` (Windows)     | `<mirror>/<v>/<file>`                |

use crate::platform::{
    ArchiveKind, ArchivePolicy, PlatformRow, PlatformTable, PlatformToken, Target,
};
use serde::Serialize;
use tinyrt_core::{Result, RuntimeError, RuntimeKind};
use url::Url;

/// Default download base for Node.js
pub const NODE_DIST: &str = "https://nodejs.org/dist";

/// Default download base for Python
pub const PYTHON_DIST: &str = "https://www.python.org/ftp/python";

pub static NODE_PLATFORMS: PlatformTable = PlatformTable {
    kind: RuntimeKind::Node,
    rows: &[
        PlatformRow {
            platform: "darwin",
            os_token: "darwin",
            aliases: &[("arm64", "arm64")],
            default_arch: "x64",
        },
        PlatformRow {
            platform: "linux",
            os_token: "linux",
            aliases: &[
                ("arm64", "arm64"),
                ("arm", "armv7l"),
                ("armv7l", "armv7l"),
                ("ppc64", "ppc64le"),
                ("ppc64le", "ppc64le"),
                ("s390", "s390x"),
                ("s390x", "s390x"),
            ],
            default_arch: "x64",
        },
        PlatformRow {
            platform: "win32",
            os_token: "win",
            aliases: &[("arm64", "arm64"), ("ia32", "x86"), ("x86", "x86")],
            default_arch: "x64",
        },
    ],
    archive: ArchivePolicy::ByPlatform,
};

pub static PYTHON_PLATFORMS: PlatformTable = PlatformTable {
    kind: RuntimeKind::Python,
    rows: &[
        PlatformRow {
            platform: "darwin",
            os_token: "macos",
            aliases: &[("arm64", "arm64")],
            default_arch: "x64",
        },
        PlatformRow {
            platform: "linux",
            os_token: "linux",
            aliases: &[("arm64", "aarch64"), ("arm", "armv7l"), ("armv7l", "armv7l")],
            default_arch: "x64",
        },
        PlatformRow {
            platform: "win32",
            os_token: "win",
            aliases: &[("arm64", "arm64"), ("ia32", "x86"), ("x86", "x86")],
            default_arch: "amd64",
        },
    ],
    archive: ArchivePolicy::ByPlatform,
};

/// Archive to download for one runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadDescriptor {
    pub kind: RuntimeKind,
    pub url: Url,
    pub file_name: String,
    pub archive_kind: ArchiveKind,
    pub platform_token: String,
    /// Directory the archive unpacks into when it is not flat
    pub top_level_dir: String,
}

pub fn platform_table(kind: RuntimeKind) -> &'static PlatformTable {
    match kind {
        RuntimeKind::Node => &NODE_PLATFORMS,
        RuntimeKind::Python => &PYTHON_PLATFORMS,
    }
}

pub fn platform_token(kind: RuntimeKind, target: &Target) -> Result<PlatformToken> {
    platform_table(kind).platform_token(target)
}

/// Resolves the download for `kind` at `version` on `target`
///
/// `mirror` replaces the kind's default download base.
///
/// # Errors
///
/// Returns `UnsupportedPlatform` for a platform outside the kind's table and
/// `Config` for an unparsable mirror URL.
pub fn resolve(
    kind: RuntimeKind,
    version: &str,
    target: &Target,
    mirror: Option<&str>,
) -> Result<DownloadDescriptor> {
    match kind {
        RuntimeKind::Node => node_artifact(version, target, mirror.unwrap_or(NODE_DIST)),
        RuntimeKind::Python => python_artifact(version, target, mirror.unwrap_or(PYTHON_DIST)),
    }
}

fn node_artifact(version: &str, target: &Target, mirror: &str) -> Result<DownloadDescriptor> {
    let token = NODE_PLATFORMS.platform_token(target)?;
    let archive_kind = NODE_PLATFORMS.archive_for(target);
    let top_level_dir = format!("node-{}-{}", version, token);
    let file_name = format!("{}.{}", top_level_dir, archive_kind.extension());
    let url = artifact_url(mirror, &[version, &file_name])?;

    Ok(DownloadDescriptor {
        kind: RuntimeKind::Node,
        url,
        file_name,
        archive_kind,
        platform_token: token.to_string(),
        top_level_dir,
    })
}

fn python_artifact(version: &str, target: &Target, mirror: &str) -> Result<DownloadDescriptor> {
    let version = strip_v(version);
    let token = PYTHON_PLATFORMS.platform_token(target)?;
    let archive_kind = PYTHON_PLATFORMS.archive_for(target);

    // The Windows embeddable package is named by architecture only
    let file_name = if target.is_windows() {
        format!("python-{}-embed-{}.{}", version, token.arch, archive_kind.extension())
    } else {
        format!("python-{}-{}.{}", version, token, archive_kind.extension())
    };
    let url = artifact_url(mirror, &[version, &file_name])?;

    Ok(DownloadDescriptor {
        kind: RuntimeKind::Python,
        url,
        file_name,
        archive_kind,
        platform_token: token.to_string(),
        top_level_dir: format!("python-{}-{}", version, token),
    })
}

/// Appends `segments` to the path of `base`
fn artifact_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| RuntimeError::Config(format!("invalid mirror URL '{}': {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| RuntimeError::Config(format!("mirror URL cannot be a base: {}", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// `v3.10.0` → `3.10.0`
pub fn strip_v(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// `22.9.0` → `v22.9.0`; Node reports versions with the prefix
pub fn with_v(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{}", version)
    }
}
