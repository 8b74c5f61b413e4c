//! Runtime contract implemented by every backend

use crate::artifact::DownloadDescriptor;
use crate::exec::ExecOutput;
use crate::platform::Target;
use async_trait::async_trait;
use std::path::Path;
use tinyrt_core::{Result, RuntimeKind};

/// One provisioned interpreter for a single (kind, version, platform, arch)
///
/// Every method takes `&self`, so a backend behind an `Arc` can serve
/// concurrent `execute` calls. Concurrent `install` calls on the same backend
/// are not coordinated and must be serialized by the caller.
#[async_trait]
pub trait Runtime: Send + Sync {
    fn kind(&self) -> RuntimeKind;

    /// Configured version in the kind's canonical spelling
    fn version(&self) -> &str;

    fn target(&self) -> &Target;

    /// Root directory of this version's files
    fn runtime_path(&self) -> &Path;

    fn executable_path(&self) -> &Path;

    /// Last known readiness; never re-verified
    fn is_installed(&self) -> bool;

    /// Artifact [`Runtime::install`] would download
    fn descriptor(&self) -> Result<DownloadDescriptor>;

    /// Runs the version query against the executable
    ///
    /// A successful check marks the backend installed.
    async fn check_installed(&self) -> bool;

    /// Makes the runtime ready, downloading it when the check fails
    ///
    /// Idempotent: an installed runtime is confirmed without network access
    /// or disk writes.
    ///
    /// # Errors
    ///
    /// Returns `InstallFailed` naming the phase that failed.
    async fn install(&self) -> Result<()>;

    /// Runs `source` as a standalone program and returns everything it produced
    ///
    /// # Errors
    ///
    /// Returns `NotInstalled` without touching the scratch area when the
    /// runtime is not ready, `Execution` if the interpreter cannot be spawned.
    async fn execute_captured(&self, source: &str) -> Result<ExecOutput>;

    /// Runs `source` as a standalone program and returns its stdout
    ///
    /// # Errors
    ///
    /// As [`Runtime::execute_captured`], plus `ScriptFailed` when the program
    /// exits unsuccessfully.
    async fn execute(&self, source: &str) -> Result<String> {
        let output = self.execute_captured(source).await?;
        output.into_stdout(self.executable_path())
    }
}
