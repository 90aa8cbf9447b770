//! stagecache - incremental stage cache for multi-stage image builds
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use stagecache::cli::{Cli, Commands, RunContext};
use stagecache::config::Config;
use stagecache::error::StageCacheResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> StageCacheResult<()> {
    let cli = Cli::parse();

    // A build must not touch config, history or cache without root
    if matches!(cli.command, Commands::Build(_)) {
        stagecache::privilege::ensure_root()?;
    }

    let ctx = RunContext::load(&cli).await?;
    init_logging(cli.verbose, &ctx.config);

    match cli.command {
        Commands::Build(args) => stagecache::cli::commands::build(args, &ctx).await,
        Commands::Status(args) => stagecache::cli::commands::status(args, &ctx).await,
        Commands::Cache(args) => stagecache::cli::commands::cache(args, &ctx).await,
        Commands::Config(args) => stagecache::cli::commands::config(args, &ctx).await,
    }
}

// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("stagecache=warn"),
        1 => EnvFilter::new("stagecache=info"),
        _ => EnvFilter::new("stagecache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
