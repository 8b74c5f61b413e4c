//! Environment variables that influence provisioning
//!
//! Values are read once into [`EnvOverrides`] so that resolution logic can be
//! tested with an explicit lookup instead of the process environment.

use crate::kind::RuntimeKind;
use std::path::PathBuf;

/// Suppresses post-setup provisioning when set to `true`
pub const SKIP_INSTALL: &str = "TINYRT_SKIP_INSTALL";

/// Set by most CI providers; `true` also suppresses post-setup provisioning
pub const CI: &str = "CI";

/// Overrides the detected CPU architecture used to pick an artifact
pub const TARGET_ARCH: &str = "TINYRT_TARGET_ARCH";

/// Overrides the detected OS platform used to pick an artifact
pub const TARGET_PLATFORM: &str = "TINYRT_TARGET_PLATFORM";

/// Overrides the default install root
pub const HOME: &str = "TINYRT_HOME";

/// Installs next to the running executable instead of the user cache
pub const PORTABLE: &str = "TINYRT_PORTABLE";

/// Base URL replacing https://nodejs.org/dist
pub const NODE_MIRROR: &str = "TINYRT_NODE_MIRROR";

/// Base URL replacing https://www.python.org/ftp/python
pub const PYTHON_MIRROR: &str = "TINYRT_PYTHON_MIRROR";

/// Snapshot of the environment variables tinyrt understands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub skip_install: bool,
    pub target_arch: Option<String>,
    pub target_platform: Option<String>,
    pub home: Option<PathBuf>,
    pub portable: bool,
    pub node_mirror: Option<String>,
    pub python_mirror: Option<String>,
}

impl EnvOverrides {
    /// Reads the current process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds overrides from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let enabled = |name: &str| {
            lookup(name)
                .map(|v| is_truthy(&v))
                .unwrap_or(false)
        };

        Self {
            skip_install: enabled(SKIP_INSTALL) || enabled(CI),
            target_arch: non_empty(TARGET_ARCH),
            target_platform: non_empty(TARGET_PLATFORM),
            home: non_empty(HOME).map(PathBuf::from),
            portable: enabled(PORTABLE),
            node_mirror: non_empty(NODE_MIRROR),
            python_mirror: non_empty(PYTHON_MIRROR),
        }
    }

    pub fn mirror(&self, kind: RuntimeKind) -> Option<&str> {
        match kind {
            RuntimeKind::Node => self.node_mirror.as_deref(),
            RuntimeKind::Python => self.python_mirror.as_deref(),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}
