//! Environment isolation utilities for testing
//!
//! This module provides functions for isolating environment variables
//! during tests to prevent interference between parallel test executions.

use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Static mutex to serialize tests that modify environment variables
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Variables touched by tinyrt; all are cleared inside [`with_isolated_env`]
const MANAGED_VARS: &[&str] = &[
    "TINYRT_HOME",
    "TINYRT_SKIP_INSTALL",
    "TINYRT_TARGET_ARCH",
    "TINYRT_TARGET_PLATFORM",
    "TINYRT_PORTABLE",
    "TINYRT_NODE_MIRROR",
    "TINYRT_PYTHON_MIRROR",
    "CI",
];

/// Run a test with an isolated tinyrt environment
///
/// This helper:
/// 1. Creates an isolated `TINYRT_HOME` directory
/// 2. Clears every other tinyrt variable (and `CI`)
/// 3. Applies the given `vars` on top
/// 4. Serializes access with [`ENV_LOCK`] and restores the environment afterwards
///
/// # Examples
///
/// ```no_run
/// use tinyrt_testkit::with_isolated_env;
///
/// with_isolated_env(&[("TINYRT_SKIP_INSTALL", "true")], |home| {
///     assert!(home.exists());
/// });
/// ```
pub fn with_isolated_env<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| {
        // Only serializing access; no data to protect
        poisoned.into_inner()
    });

    let saved: Vec<(&str, Option<String>)> = MANAGED_VARS
        .iter()
        .map(|name| (*name, std::env::var(name).ok()))
        .collect();

    let fake_home = TempDir::new().expect("Failed to create isolated TINYRT_HOME");

    // SAFETY: We hold ENV_LOCK, ensuring no other test is modifying env vars concurrently.
    unsafe {
        for name in MANAGED_VARS {
            std::env::remove_var(name);
        }
        std::env::set_var("TINYRT_HOME", fake_home.path());
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
    }

    let result = f(fake_home.path());

    // SAFETY: We still hold ENV_LOCK, ensuring exclusive access to env vars.
    unsafe {
        for (name, value) in saved {
            match value {
                Some(v) => std::env::set_var(name, v),
                None => std::env::remove_var(name),
            }
        }
    }

    drop(fake_home);
    result
}
