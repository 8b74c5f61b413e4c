use crate::error::{Result, RuntimeError};
use crate::kind::RuntimeKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the default install root lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Per-user cache directory
    #[default]
    User,
    /// `runtimes/` next to the running executable
    Portable,
}

/// Selector for one runtime backend
///
/// Every field is optional; unset fields fall back to environment overrides
/// and then to detected or built-in defaults. When `runtime_path` is set the
/// install root and version are not used to locate the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub runtime_path: Option<PathBuf>,
    pub version: Option<String>,
    pub platform: Option<String>,
    pub arch: Option<String>,
    pub mirror: Option<String>,
    pub root: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub deployment: Option<DeploymentMode>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    pub fn with_runtime_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.runtime_path = Some(path.into());
        self
    }

    pub fn with_mirror(mut self, mirror: impl Into<String>) -> Self {
        self.mirror = Some(mirror.into());
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn with_deployment(mut self, mode: DeploymentMode) -> Self {
        self.deployment = Some(mode);
        self
    }

    /// Returns `self` with every field set in `top` replaced by that value
    pub fn overlay(self, top: RuntimeConfig) -> RuntimeConfig {
        RuntimeConfig {
            runtime_path: top.runtime_path.or(self.runtime_path),
            version: top.version.or(self.version),
            platform: top.platform.or(self.platform),
            arch: top.arch.or(self.arch),
            mirror: top.mirror.or(self.mirror),
            root: top.root.or(self.root),
            scratch_dir: top.scratch_dir.or(self.scratch_dir),
            deployment: top.deployment.or(self.deployment),
        }
    }

    pub fn version_or_default(&self, kind: RuntimeKind) -> String {
        self.version
            .clone()
            .unwrap_or_else(|| kind.default_version().to_string())
    }
}

/// tinyrt.toml schema
///
/// ```toml
/// root = "/opt/tinyrt"
///
/// [node]
/// version = "v22.9.0"
///
/// [python]
/// version = "3.10.0"
/// arch = "arm64"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub root: Option<PathBuf>,
    pub scratch_dir: Option<PathBuf>,
    pub deployment: Option<DeploymentMode>,
    pub node: RuntimeConfig,
    pub python: RuntimeConfig,
}

impl ConfigFile {
    pub const FILE_NAME: &'static str = "tinyrt.toml";

    /// Reads and parses a tinyrt.toml file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RuntimeError::io(format!("read {}", path.display()), e))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RuntimeError::Config(e.to_string()))
    }

    /// Configuration for one kind: the kind's table over the shared top-level keys
    pub fn runtime(&self, kind: RuntimeKind) -> RuntimeConfig {
        let shared = RuntimeConfig {
            root: self.root.clone(),
            scratch_dir: self.scratch_dir.clone(),
            deployment: self.deployment,
            ..RuntimeConfig::default()
        };

        let table = match kind {
            RuntimeKind::Node => self.node.clone(),
            RuntimeKind::Python => self.python.clone(),
        };

        shared.overlay(table)
    }
}
