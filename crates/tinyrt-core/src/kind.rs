use crate::error::RuntimeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interpreter family handled by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    Node,
    Python,
}

impl RuntimeKind {
    pub const ALL: [RuntimeKind; 2] = [RuntimeKind::Node, RuntimeKind::Python];

    /// Lowercase identifier, also used as the install root subdirectory
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeKind::Node => "node",
            RuntimeKind::Python => "python",
        }
    }

    /// Human-readable name for logs and CLI output
    pub fn display_name(&self) -> &'static str {
        match self {
            RuntimeKind::Node => "Node.js",
            RuntimeKind::Python => "Python",
        }
    }

    /// Version installed when the configuration does not name one
    pub fn default_version(&self) -> &'static str {
        match self {
            RuntimeKind::Node => "v22.9.0",
            RuntimeKind::Python => "3.10.0",
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeKind {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" | "nodejs" => Ok(RuntimeKind::Node),
            "python" | "python3" => Ok(RuntimeKind::Python),
            other => Err(RuntimeError::Config(format!(
                "unknown runtime kind '{}' (expected 'node' or 'python')",
                other
            ))),
        }
    }
}
