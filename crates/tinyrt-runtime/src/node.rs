//! Node.js backend
//!
//! Official distributions unpack to `node-<version>-<token>/`, so archives are
//! extracted into the install root and the top-level directory is renamed to
//! `<root>/<version>`. Versions carry the `v` prefix that `node -v` prints.

use crate::artifact::{DownloadDescriptor, with_v};
use crate::contract::Runtime;
use crate::exec::{ExecOutput, run_script};
use crate::install::{self, ExtractInto, Installation, Layout, VersionMatch};
use crate::platform::Target;
use crate::transfer::{ArchiveExtractor, Extractor, Fetcher, HttpFetcher};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tinyrt_core::{EnvOverrides, Result, RuntimeConfig, RuntimeKind};

pub(crate) static LAYOUT: Layout = Layout {
    kind: RuntimeKind::Node,
    interpreter: "node",
    windows_interpreter: "node.exe",
    script_extension: "js",
    version_flag: "-v",
    version_match: VersionMatch::Exact,
    extract_into: ExtractInto::InstallRoot,
    normalize_version: with_v,
};

/// Node.js interpreter managed under one runtime path
pub struct NodeRuntime {
    installation: Installation,
    installed: AtomicBool,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
}

impl NodeRuntime {
    /// Creates a backend from `config` and the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if the install root or HTTP client cannot be set up.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        Self::with_env(config, &EnvOverrides::from_env())
    }

    pub fn with_env(config: RuntimeConfig, env: &EnvOverrides) -> Result<Self> {
        let installation = Installation::resolve(&LAYOUT, &config, env)?;
        tracing::debug!(
            "node backend: {} for {} at {}",
            installation.version,
            installation.target,
            installation.runtime_path.display()
        );

        Ok(Self {
            installation,
            installed: AtomicBool::new(false),
            fetcher: Arc::new(HttpFetcher::new()?),
            extractor: Arc::new(ArchiveExtractor),
        })
    }

    /// Replaces the collaborator that downloads archives
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replaces the collaborator that unpacks archives
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.installation.scratch_dir
    }
}

#[async_trait]
impl Runtime for NodeRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Node
    }

    fn version(&self) -> &str {
        &self.installation.version
    }

    fn target(&self) -> &Target {
        &self.installation.target
    }

    fn runtime_path(&self) -> &Path {
        &self.installation.runtime_path
    }

    fn executable_path(&self) -> &Path {
        &self.installation.executable
    }

    fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    fn descriptor(&self) -> Result<DownloadDescriptor> {
        self.installation.descriptor()
    }

    async fn check_installed(&self) -> bool {
        install::check_and_mark(&self.installation, &LAYOUT, &self.installed).await
    }

    async fn install(&self) -> Result<()> {
        install::install(
            &self.installation,
            &LAYOUT,
            &self.installed,
            self.fetcher.as_ref(),
            self.extractor.as_ref(),
        )
        .await
    }

    async fn execute_captured(&self, source: &str) -> Result<ExecOutput> {
        install::require_installed(&self.installation, &LAYOUT, &self.installed).await?;
        run_script(
            &self.installation.executable,
            &self.installation.scratch_dir,
            LAYOUT.script_extension,
            source,
        )
        .await
    }
}
