//! Exec command - run a program with an installed runtime

use crate::cli::Selector;
use crate::context::Context;
use crate::output::print_json;
use anyhow::{Context as _, Result};
use std::io::Write;
use std::path::Path;
use tinyrt_core::RuntimeKind;
use tokio::io::AsyncReadExt;

/// Execute `tinyrt exec <kind> [FILE]`
///
/// Prints the program's stdout and stderr and exits with its exit code.
pub async fn run(
    ctx: &Context,
    kind: RuntimeKind,
    file: Option<&Path>,
    selector: &Selector,
    json: bool,
) -> Result<()> {
    let source = read_source(file).await?;
    let runtime = ctx.runtime(kind, selector)?;

    let output = runtime.execute_captured(&source).await?;

    if json {
        print_json(&output)?;
    } else {
        print!("{}", output.stdout);
        eprint!("{}", output.stderr);
        std::io::stdout().flush()?;
    }

    match output.exit_code {
        Some(0) => Ok(()),
        Some(code) => std::process::exit(code),
        None => anyhow::bail!("{} was terminated by a signal", runtime.executable_path().display()),
    }
}

async fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut source = String::new();
            tokio::io::stdin()
                .read_to_string(&mut source)
                .await
                .context("Failed to read program from stdin")?;
            Ok(source)
        }
    }
}
