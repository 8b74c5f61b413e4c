//! Resolve command - show the artifact a runtime would download

use crate::cli::Selector;
use crate::context::Context;
use crate::output::{print_json, print_text};
use anyhow::Result;
use tinyrt_core::RuntimeKind;

/// Execute `tinyrt resolve <kind>`
pub fn run(ctx: &Context, kind: RuntimeKind, selector: &Selector, json: bool) -> Result<()> {
    let runtime = ctx.runtime(kind, selector)?;
    let descriptor = runtime.descriptor()?;

    if json {
        return print_json(&descriptor);
    }

    print_text(&format!("{} {}", kind.display_name(), runtime.version()))?;
    print_text(&format!("  platform:  {}", descriptor.platform_token))?;
    print_text(&format!("  file:      {}", descriptor.file_name))?;
    print_text(&format!("  archive:   {}", descriptor.archive_kind))?;
    print_text(&format!("  url:       {}", descriptor.url))?;
    Ok(())
}
