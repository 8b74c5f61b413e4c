//! Install command - download and install a runtime

use crate::cli::Selector;
use crate::context::Context;
use crate::output::{check_mark, print_text};
use anyhow::Result;
use tinyrt_core::RuntimeKind;

/// Execute `tinyrt install <kind>`
pub async fn run(ctx: &Context, kind: RuntimeKind, selector: &Selector) -> Result<()> {
    let runtime = ctx.runtime(kind, selector)?;

    if runtime.check_installed().await {
        print_text(&format!(
            "{} {} {} already installed at {}",
            check_mark(true),
            kind.display_name(),
            runtime.version(),
            runtime.runtime_path().display()
        ))?;
        return Ok(());
    }

    let descriptor = runtime.descriptor()?;
    print_text(&format!(
        "Installing {} {} for {} from {}...",
        kind.display_name(),
        runtime.version(),
        descriptor.platform_token,
        descriptor.url
    ))?;

    runtime.install().await?;

    print_text(&format!(
        "{} Installed to: {}",
        check_mark(true),
        runtime.runtime_path().display()
    ))?;
    Ok(())
}
