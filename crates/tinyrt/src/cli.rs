//! CLI command structure using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tinyrt_core::{RuntimeConfig, RuntimeKind};

#[derive(Parser)]
#[command(name = "tinyrt")]
#[command(version, about = "Provision and run Node.js and Python interpreters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./tinyrt.toml when present)
    #[arg(long, global = true, env = "TINYRT_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download and install a runtime
    Install {
        /// Runtime kind (node or python)
        kind: RuntimeKind,

        #[command(flatten)]
        selector: Selector,
    },

    /// Run a program with an installed runtime
    Exec {
        kind: RuntimeKind,

        /// Source file; reads stdin when omitted
        file: Option<PathBuf>,

        #[command(flatten)]
        selector: Selector,

        /// Output stdout, stderr and exit code as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show installation state of a runtime
    Status {
        kind: RuntimeKind,

        #[command(flatten)]
        selector: Selector,

        #[arg(long)]
        json: bool,
    },

    /// Show the artifact a runtime would download
    Resolve {
        kind: RuntimeKind,

        #[command(flatten)]
        selector: Selector,

        #[arg(long)]
        json: bool,
    },

    /// Install runtimes after setup, never failing
    EnsureReady {
        /// Runtime kinds to provision (all when omitted)
        kinds: Vec<RuntimeKind>,
    },
}

/// Flags selecting one installation, applied over file and environment
#[derive(Args, Debug, Clone, Default)]
pub struct Selector {
    /// Version to use (e.g. "v22.9.0" or "3.10.0")
    #[arg(long = "version", value_name = "VERSION")]
    pub runtime_version: Option<String>,

    /// Target platform (darwin, linux, win32)
    #[arg(long)]
    pub platform: Option<String>,

    /// Target architecture (x64, arm64, ...)
    #[arg(long)]
    pub arch: Option<String>,

    /// Use this directory as the runtime path
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Download base URL
    #[arg(long)]
    pub mirror: Option<String>,
}

impl Selector {
    pub fn to_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            runtime_path: self.path.clone(),
            version: self.runtime_version.clone(),
            platform: self.platform.clone(),
            arch: self.arch.clone(),
            mirror: self.mirror.clone(),
            ..RuntimeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_install_with_selector() {
        let cli = Cli::try_parse_from([
            "tinyrt",
            "install",
            "python",
            "--version",
            "3.11.4",
            "--arch",
            "arm64",
        ])
        .unwrap();

        match cli.command {
            Commands::Install { kind, selector } => {
                assert_eq!(kind, RuntimeKind::Python);
                assert_eq!(selector.runtime_version.as_deref(), Some("3.11.4"));
                assert_eq!(selector.arch.as_deref(), Some("arm64"));
            }
            _ => panic!("Expected install command"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["tinyrt", "status", "ruby"]).is_err());
    }

    #[test]
    fn test_ensure_ready_accepts_no_kinds() {
        let cli = Cli::try_parse_from(["tinyrt", "ensure-ready"]).unwrap();
        assert!(matches!(cli.command, Commands::EnsureReady { kinds } if kinds.is_empty()));
    }
}
