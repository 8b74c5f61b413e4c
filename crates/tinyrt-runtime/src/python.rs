//! Python backend
//!
//! Archives are unpacked directly into the runtime path. Nested archives
//! (`python-<v>-<token>/...`) are then lifted so the interpreter ends up at
//! `<runtime path>/bin/python3`; flat archives need no move. Versions are
//! spelled without a `v` prefix.

use crate::artifact::{DownloadDescriptor, strip_v};
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

fn bare_version(version: &str) -> String {
    strip_v(version).to_string()
}

pub(crate) static LAYOUT: Layout = Layout {
    kind: RuntimeKind::Python,
    interpreter: "python3",
    windows_interpreter: "python.exe",
    script_extension: "py",
    version_flag: "--version",
    version_match: VersionMatch::Contains,
    extract_into: ExtractInto::RuntimePath,
    normalize_version: bare_version,
};

/// Python interpreter managed under one runtime path
pub struct PythonRuntime {
    installation: Installation,
    installed: AtomicBool,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
}

impl PythonRuntime {
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
            "python backend: {} for {} at {}",
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

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.installation.scratch_dir
    }
}

#[async_trait]
impl Runtime for PythonRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Python
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_loses_v_prefix() {
        let config = RuntimeConfig::new().with_root("/rt").with_version("v3.12.1");
        let runtime = PythonRuntime::with_env(config, &EnvOverrides::default()).unwrap();

        assert_eq!(runtime.version(), "3.12.1");
        assert_eq!(runtime.runtime_path(), Path::new("/rt").join("3.12.1"));
    }

    #[test]
    fn test_linux_arm_descriptor() {
        let config = RuntimeConfig::new()
            .with_root("/rt")
            .with_platform("linux")
            .with_arch("armv7l");
        let runtime = PythonRuntime::with_env(config, &EnvOverrides::default()).unwrap();

        let descriptor = runtime.descriptor().unwrap();
        assert_eq!(descriptor.platform_token, "linux-armv7l");
        assert_eq!(descriptor.file_name, "python-3.10.0-linux-armv7l.tar.gz");
        assert_eq!(
            runtime.executable_path(),
            Path::new("/rt/3.10.0").join("bin").join("python3")
        );
    }

    #[test]
    fn test_windows_embed_descriptor() {
        let config = RuntimeConfig::new()
            .with_root("/rt")
            .with_platform("win32")
            .with_arch("x64");
        let runtime = PythonRuntime::with_env(config, &EnvOverrides::default()).unwrap();

        let descriptor = runtime.descriptor().unwrap();
        assert_eq!(descriptor.file_name, "python-3.10.0-embed-amd64.zip");
        assert_eq!(
            descriptor.url.as_str(),
            "https://www.python.org/ftp/python/3.10.0/python-3.10.0-embed-amd64.zip"
        );
        assert_eq!(
            runtime.executable_path(),
            Path::new("/rt/3.10.0").join("python.exe")
        );
    }

    #[tokio::test]
    async fn test_execute_requires_install() {
        let temp = tinyrt_testkit::temp_dir_in_workspace();
        let scratch = temp.path().join("scratch");
        let config = RuntimeConfig::new()
            .with_root(temp.path().join("rt"))
            .with_scratch_dir(&scratch);
        let runtime = PythonRuntime::with_env(config, &EnvOverrides::default()).unwrap();

        let err = runtime.execute("print(1)").await.unwrap_err();
        assert!(err.is_not_installed());
        assert!(tinyrt_testkit::list_dir(&scratch).is_empty());
    }
}
