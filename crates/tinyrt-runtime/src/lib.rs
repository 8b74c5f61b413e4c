//! Runtime provisioning and execution engine
//!
//! Provides on-demand Node.js and Python interpreters:
//!
//! - [`artifact`]: maps (kind, version, platform, arch) to a download
//! - [`install`]: idempotent check → download → extract → normalize protocol
//! - [`exec`]: runs source text through a temporary script file
//! - [`node`] / [`python`]: the two [`Runtime`] backends
//!
//! # Example
//!
//! ```no_run
//! use tinyrt_core::{RuntimeConfig, RuntimeKind};
//! use tinyrt_runtime::create_runtime;
//!
//! # async fn example() -> tinyrt_core::Result<()> {
//! let runtime = create_runtime(RuntimeKind::Node, RuntimeConfig::new())?;
//! runtime.install().await?;
//! let out = runtime.execute("console.log(1 + 1)").await?;
//! assert_eq!(out.trim(), "2");
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod contract;
pub mod exec;
pub mod install;
pub mod node;
pub mod platform;
pub mod python;
pub mod ready;
pub mod transfer;

// Re-export commonly used types
pub use artifact::DownloadDescriptor;
pub use contract::Runtime;
pub use exec::{ExecOutput, spawn_and_capture};
pub use node::NodeRuntime;
pub use platform::{ArchiveKind, Target};
pub use python::PythonRuntime;
pub use ready::{ReadyOutcome, ensure_ready};
pub use transfer::{ArchiveExtractor, Extractor, Fetcher, HttpFetcher};

use tinyrt_core::{EnvOverrides, Result, RuntimeConfig, RuntimeKind};

/// Creates the backend for `kind` from `config` and the process environment
pub fn create_runtime(kind: RuntimeKind, config: RuntimeConfig) -> Result<Box<dyn Runtime>> {
    create_runtime_with_env(kind, config, &EnvOverrides::from_env())
}

pub fn create_runtime_with_env(
    kind: RuntimeKind,
    config: RuntimeConfig,
    env: &EnvOverrides,
) -> Result<Box<dyn Runtime>> {
    Ok(match kind {
        RuntimeKind::Node => Box::new(NodeRuntime::with_env(config, env)?),
        RuntimeKind::Python => Box::new(PythonRuntime::with_env(config, env)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_runtime_dispatches_on_kind() {
        for kind in RuntimeKind::ALL {
            let runtime = create_runtime_with_env(
                kind,
                RuntimeConfig::new().with_root("/rt"),
                &EnvOverrides::default(),
            )
            .unwrap();
            assert_eq!(runtime.kind(), kind);
            assert_eq!(runtime.version(), kind.default_version());
        }
    }
}
