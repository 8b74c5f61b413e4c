//! Status command - show installation state of a runtime

use crate::cli::Selector;
use crate::context::Context;
use crate::output::{check_mark, print_json, print_text};
use anyhow::Result;
use serde::Serialize;
use tinyrt_core::RuntimeKind;

/// Status command JSON output schema
#[derive(Debug, Serialize)]
struct StatusOutput {
    kind: RuntimeKind,
    version: String,
    platform: String,
    arch: String,
    installed: bool,
    runtime_path: String,
    executable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute `tinyrt status <kind>`
pub async fn run(ctx: &Context, kind: RuntimeKind, selector: &Selector, json: bool) -> Result<()> {
    let runtime = ctx.runtime(kind, selector)?;
    let installed = runtime.check_installed().await;

    let (url, error) = match runtime.descriptor() {
        Ok(descriptor) => (Some(descriptor.url.to_string()), None),
        Err(e) => (None, Some(e.to_string())),
    };

    let status = StatusOutput {
        kind,
        version: runtime.version().to_string(),
        platform: runtime.target().platform.clone(),
        arch: runtime.target().arch.clone(),
        installed,
        runtime_path: runtime.runtime_path().display().to_string(),
        executable: runtime.executable_path().display().to_string(),
        url,
        error,
    };

    if json {
        return print_json(&status);
    }

    let state = if status.installed {
        "installed"
    } else {
        "not installed"
    };
    print_text(&format!(
        "{} {} {} ({}-{}): {}",
        check_mark(status.installed),
        kind.display_name(),
        status.version,
        status.platform,
        status.arch,
        state
    ))?;
    print_text(&format!("  runtime path: {}", status.runtime_path))?;
    print_text(&format!("  executable:   {}", status.executable))?;
    match (&status.url, &status.error) {
        (Some(url), _) => print_text(&format!("  artifact:     {}", url))?,
        (None, Some(error)) => print_text(&format!("  artifact:     {}", error))?,
        (None, None) => {}
    }
    Ok(())
}
