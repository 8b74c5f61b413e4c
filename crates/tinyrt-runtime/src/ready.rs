//! Post-setup provisioning
//!
//! Runs after a package or tool is set up so the first `execute` does not pay
//! for the download. Failures are logged and swallowed here; callers that
//! need the error should call [`Runtime::install`] directly.

use crate::contract::Runtime;
use serde::Serialize;
use tinyrt_core::EnvOverrides;

/// What [`ensure_ready`] did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "lowercase")]
pub enum ReadyOutcome {
    /// `TINYRT_SKIP_INSTALL` or `CI` was set
    Skipped,
    Ready,
    /// Install failed with the contained message
    Failed(String),
}

/// Installs `runtime` unless the environment asks to skip provisioning
pub async fn ensure_ready(runtime: &dyn Runtime, env: &EnvOverrides) -> ReadyOutcome {
    if env.skip_install {
        tracing::info!(
            "skipping {} provisioning (install skipped by environment)",
            runtime.kind().display_name()
        );
        return ReadyOutcome::Skipped;
    }

    match runtime.install().await {
        Ok(()) => ReadyOutcome::Ready,
        Err(e) => {
            tracing::warn!(
                "failed to provision {} {}: {}",
                runtime.kind().display_name(),
                runtime.version(),
                e
            );
            ReadyOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeRuntime;
    use tinyrt_core::RuntimeConfig;

    #[tokio::test]
    async fn test_skip_install_does_nothing() {
        let temp = tinyrt_testkit::temp_dir_in_workspace();
        let env = EnvOverrides {
            skip_install: true,
            ..EnvOverrides::default()
        };
        let config = RuntimeConfig::new().with_root(temp.path().join("rt"));
        let runtime = NodeRuntime::with_env(config, &env).unwrap();

        assert_eq!(ensure_ready(&runtime, &env).await, ReadyOutcome::Skipped);
        assert!(!runtime.is_installed());
        assert!(!temp.path().join("rt").exists());
    }

    #[tokio::test]
    async fn test_failure_is_swallowed() {
        let temp = tinyrt_testkit::temp_dir_in_workspace();
        let config = RuntimeConfig::new()
            .with_root(temp.path().join("rt"))
            .with_scratch_dir(temp.path().join("scratch"))
            .with_platform("aix")
            .with_arch("ppc64");
        let runtime = NodeRuntime::with_env(config, &EnvOverrides::default()).unwrap();

        match ensure_ready(&runtime, &EnvOverrides::default()).await {
            ReadyOutcome::Failed(message) => assert!(message.contains("UNSUPPORTED_PLATFORM")),
            other => panic!("Expected Failed, got: {:?}", other),
        }
        assert!(!runtime.is_installed());
    }
}
