//! Configuration layering for CLI commands
//!
//! Command-line flags beat tinyrt.toml. Environment variables only fill
//! values neither of them sets, the same fallback the backends apply.

use crate::cli::Selector;
use anyhow::{Context as _, Result};
use std::path::Path;
use tinyrt_core::{ConfigFile, EnvOverrides, RuntimeConfig, RuntimeKind};
use tinyrt_runtime::{Runtime, create_runtime_with_env};

pub struct Context {
    pub file: ConfigFile,
    pub env: EnvOverrides,
}

impl Context {
    /// Loads the configuration file and snapshots the environment
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing, or if any
    /// configuration file fails to parse.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => ConfigFile::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => {
                let default_path = std::env::current_dir()?.join(ConfigFile::FILE_NAME);
                if default_path.is_file() {
                    ConfigFile::from_file(&default_path)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        Ok(Self {
            file,
            env: EnvOverrides::from_env(),
        })
    }

    /// Explicit configuration for `kind` with `selector` applied last
    pub fn runtime_config(&self, kind: RuntimeKind, selector: &Selector) -> RuntimeConfig {
        self.file.runtime(kind).overlay(selector.to_config())
    }

    pub fn runtime(&self, kind: RuntimeKind, selector: &Selector) -> Result<Box<dyn Runtime>> {
        let config = self.runtime_config(kind, selector);
        tracing::debug!("{} configuration: {:?}", kind, config);
        Ok(create_runtime_with_env(kind, config, &self.env)?)
    }
}
