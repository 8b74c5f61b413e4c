mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use context::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match Context::load(cli.config.as_deref()) {
        Ok(ctx) => run(cli.command, &ctx).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Commands::Install { kind, selector } => commands::install::run(ctx, kind, &selector).await,
        Commands::Exec {
            kind,
            file,
            selector,
            json,
        } => commands::exec::run(ctx, kind, file.as_deref(), &selector, json).await,
        Commands::Status {
            kind,
            selector,
            json,
        } => commands::status::run(ctx, kind, &selector, json).await,
        Commands::Resolve {
            kind,
            selector,
            json,
        } => commands::resolve::run(ctx, kind, &selector, json),
        Commands::EnsureReady { kinds } => commands::ready::run(ctx, &kinds).await,
    }
}

/// Logs go to stderr so stdout carries only command output
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
