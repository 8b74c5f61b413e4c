//! Shared types for tinyrt: error taxonomy, runtime kinds, configuration
//! layering and default install locations.

// Core modules
pub mod config;
pub mod env;
pub mod error;
pub mod kind;
pub mod paths;

// Re-export commonly used types
pub use config::{ConfigFile, DeploymentMode, RuntimeConfig};
pub use env::EnvOverrides;
pub use error::{InstallPhase, Result, RuntimeError};
pub use kind::RuntimeKind;
