use crate::kind::RuntimeKind;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause carried by transfer failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Step of the install protocol that was running when a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Checking,
    Downloading,
    Extracting,
    Normalizing,
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallPhase::Checking => write!(f, "checking"),
            InstallPhase::Downloading => write!(f, "downloading"),
            InstallPhase::Extracting => write!(f, "extracting"),
            InstallPhase::Normalizing => write!(f, "normalizing"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RuntimeError {
    // Resolution errors
    #[error(
        "UNSUPPORTED_PLATFORM: no {kind} artifact for platform '{platform}' with architecture '{arch}'"
    )]
    UnsupportedPlatform {
        kind: RuntimeKind,
        platform: String,
        arch: String,
    },

    // Install errors
    #[error("TRANSFER_FAILED: {url}: {source}")]
    Transfer {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("EXTRACTION_FAILED: {}: {reason}", archive.display())]
    Extraction { archive: PathBuf, reason: String },

    #[error("INSTALL_FAILED: {kind} {version} failed while {phase}: {source}")]
    InstallFailed {
        kind: RuntimeKind,
        version: String,
        phase: InstallPhase,
        #[source]
        source: Box<RuntimeError>,
    },

    // Execution errors
    #[error("NOT_INSTALLED: {kind} {version} is not installed, call install() first")]
    NotInstalled { kind: RuntimeKind, version: String },

    #[error("EXECUTION_FAILED: could not run {}: {source}", executable.display())]
    Execution {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("SCRIPT_FAILED: {} exited with {status}: {stderr}", executable.display())]
    ScriptFailed {
        executable: PathBuf,
        status: String,
        stderr: String,
    },

    // Config errors
    #[error("CONFIG_INVALID: {0}")]
    Config(String),

    // IO errors
    #[error("IO_ERROR: failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl RuntimeError {
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        RuntimeError::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Error that caused an install to fail, or `self` for any other variant
    pub fn root_cause(&self) -> &RuntimeError {
        match self {
            RuntimeError::InstallFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_not_installed(&self) -> bool {
        matches!(self, RuntimeError::NotInstalled { .. })
    }

    pub fn is_unsupported_platform(&self) -> bool {
        matches!(self.root_cause(), RuntimeError::UnsupportedPlatform { .. })
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
