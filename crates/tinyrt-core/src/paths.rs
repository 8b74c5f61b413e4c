//! Default locations for installed runtimes and scratch files
//!
//! Layout of an install root:
//!
//! ```text
//! <root>/
//!   v22.9.0/          one directory per installed version
//!     bin/node        (non-Windows)
//!     node.exe        (Windows)
//! ```
//!
//! Default roots:
//!
//! - **User**: `<cache dir>/tinyrt/<kind>` (e.g. `~/.cache/tinyrt/node` on Linux)
//! - **Portable**: `<directory of the current executable>/runtimes/<kind>`
//! - `TINYRT_HOME` replaces either with `$TINYRT_HOME/<kind>`

use crate::config::{DeploymentMode, RuntimeConfig};
use crate::env::EnvOverrides;
use crate::error::{Result, RuntimeError};
use crate::kind::RuntimeKind;
use std::path::PathBuf;

pub const APP_DIR: &str = "tinyrt";

/// Subdirectory of the scratch area receiving downloaded archives
pub const DOWNLOAD_DIR: &str = "tinyrt-download";

/// Install root for `kind` when the configuration names none
pub fn default_install_root(
    kind: RuntimeKind,
    mode: DeploymentMode,
    env: &EnvOverrides,
) -> Result<PathBuf> {
    if let Some(home) = &env.home {
        return Ok(home.join(kind.as_str()));
    }

    match mode {
        DeploymentMode::User => {
            let base = dirs::cache_dir().ok_or_else(|| {
                RuntimeError::Config("could not determine cache directory".to_string())
            })?;
            Ok(base.join(APP_DIR).join(kind.as_str()))
        }
        DeploymentMode::Portable => {
            let exe = std::env::current_exe()
                .map_err(|e| RuntimeError::io("locate current executable", e))?;
            let dir = exe.parent().ok_or_else(|| {
                RuntimeError::Config(format!(
                    "executable {} has no parent directory",
                    exe.display()
                ))
            })?;
            Ok(dir.join("runtimes").join(kind.as_str()))
        }
    }
}

/// Install root after applying configuration and environment
pub fn install_root(
    kind: RuntimeKind,
    config: &RuntimeConfig,
    env: &EnvOverrides,
) -> Result<PathBuf> {
    if let Some(root) = &config.root {
        return Ok(root.clone());
    }

    let mode = config.deployment.unwrap_or(if env.portable {
        DeploymentMode::Portable
    } else {
        DeploymentMode::User
    });

    default_install_root(kind, mode, env)
}

/// Shared scratch area for scripts and downloads
pub fn scratch_root(config: &RuntimeConfig) -> PathBuf {
    config
        .scratch_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir)
}

pub fn download_dir(config: &RuntimeConfig) -> PathBuf {
    scratch_root(config).join(DOWNLOAD_DIR)
}
