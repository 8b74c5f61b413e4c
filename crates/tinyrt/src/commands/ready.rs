//! Ensure-ready command - best-effort provisioning after setup

use crate::cli::Selector;
use crate::context::Context;
use crate::output::print_text;
use anyhow::Result;
use colored::Colorize;
use tinyrt_core::RuntimeKind;
use tinyrt_runtime::{ReadyOutcome, ensure_ready};

/// Execute `tinyrt ensure-ready [KIND...]`
///
/// # Returns
///
/// Always returns Ok(()) - provisioning failures are reported, not raised
pub async fn run(ctx: &Context, kinds: &[RuntimeKind]) -> Result<()> {
    let kinds = if kinds.is_empty() {
        RuntimeKind::ALL.to_vec()
    } else {
        kinds.to_vec()
    };

    for kind in kinds {
        let outcome = match ctx.runtime(kind, &Selector::default()) {
            Ok(runtime) => ensure_ready(runtime.as_ref(), &ctx.env).await,
            Err(e) => {
                tracing::warn!("failed to set up {}: {}", kind.display_name(), e);
                ReadyOutcome::Failed(e.to_string())
            }
        };

        let line = match &outcome {
            ReadyOutcome::Skipped => format!("{} {} skipped", "-".yellow(), kind),
            ReadyOutcome::Ready => format!("{} {} ready", "✓".green(), kind),
            ReadyOutcome::Failed(error) => format!("{} {} failed: {}", "✗".red(), kind, error),
        };
        let _ = print_text(&line);
    }

    Ok(())
}
