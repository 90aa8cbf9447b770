//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// stagecache - incremental stage cache for multi-stage image builds
///
/// Skips build stages whose sources have not changed since they were last
/// cached, restores their output, runs the build once and caches every
/// rebuilt stage.
#[derive(Parser, Debug)]
#[command(name = "stagecache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STAGECACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local stagecache.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Build tree holding the stage<N> directories
    #[arg(short = 'C', long, global = true)]
    pub source_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restore cached stages, run the build and cache rebuilt stages
    Build(BuildArgs),

    /// Show which stages would be skipped or rebuilt
    Status(StatusArgs),

    /// Inspect or clear the stage cache
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Let the build tool resume stages instead of starting them clean
    #[arg(long)]
    pub resume: bool,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// How to print the per-stage decisions
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format for status and cache listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns with colour
    Table,
    /// A single JSON document
    Json,
    /// `stage<N> <value>` per line, for scripts
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List the cached version of every stage
    List {
        /// How to print the cache entries
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove cached stages, forcing them to be rebuilt
    Clear {
        /// Only clear this stage (later stages are rebuilt anyway)
        #[arg(long)]
        stage: Option<usize>,

        /// Do not ask before deleting
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Defaults to `show`
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print which config file is in use
    Path,

    /// Write a default configuration file
    Init {
        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },
}
