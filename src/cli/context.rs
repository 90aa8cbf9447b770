//! Configuration and paths shared by every command

use crate::build::BuildSettings;
use crate::cli::args::{Cli, Commands};
use crate::config::{Config, ConfigManager};
use crate::error::{StageCacheError, StageCacheResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` / `STAGECACHE_CONFIG`
    Explicit(PathBuf),
    /// `stagecache.toml` found next to the build tree
    Local(PathBuf),
    /// `~/.config/stagecache/config.toml` (may not exist)
    Global(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(p) | Self::Local(p) | Self::Global(p) => p,
        }
    }
}

/// Loaded configuration plus the resolved build tree
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,
    pub config_source: ConfigSource,
    pub source_dir: PathBuf,
}

impl RunContext {
    /// Load configuration the way the CLI flags ask for
    ///
    /// An explicit config file must exist, except for `config` commands
    /// which may be about to create it.
    pub async fn load(cli: &Cli) -> StageCacheResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| StageCacheError::io("getting current directory", e))?;
        let cli_source = cli.source_dir.as_ref().map(|dir| cwd.join(dir));

        let config_source = if let Some(ref path) = cli.config {
            ConfigSource::Explicit(cwd.join(path))
        } else {
            let search_from = cli_source.as_deref().unwrap_or(cwd.as_path());
            let local = if cli.no_local {
                debug!("Local config discovery disabled (--no-local)");
                None
            } else {
                ConfigManager::find_local_config(search_from)
            };
            match local {
                Some(path) => {
                    debug!("Found local config: {}", path.display());
                    ConfigSource::Local(path)
                }
                None => ConfigSource::Global(ConfigManager::default_config_path()),
            }
        };

        let manager = ConfigManager::with_path(config_source.path().to_path_buf());
        let require_file = !matches!(cli.command, Commands::Config(_));
        let config = match config_source {
            ConfigSource::Explicit(_) if require_file => manager.load_required().await?,
            _ => manager.load().await?,
        };

        let source_dir = resolve_source_dir(&config, &config_source, cli_source, &cwd);
        debug!("Build tree: {}", source_dir.display());

        Ok(Self {
            config,
            config_source,
            source_dir,
        })
    }

    /// Immutable settings for the build controller
    pub fn settings(&self) -> StageCacheResult<BuildSettings> {
        BuildSettings::resolve(&self.config, &self.source_dir)
    }
}

/// Pick the build tree: the command line wins, then `paths.source_dir`
/// (relative to the config file), then the directory of a local config,
/// then the current directory
pub fn resolve_source_dir(
    config: &Config,
    config_source: &ConfigSource,
    cli_source: Option<PathBuf>,
    cwd: &Path,
) -> PathBuf {
    if let Some(dir) = cli_source {
        return dir;
    }

    let config_dir = config_source.path().parent().unwrap_or(cwd);
    if let Some(ref dir) = config.paths.source_dir {
        return config_dir.join(dir);
    }

    match config_source {
        ConfigSource::Local(_) => config_dir.to_path_buf(),
        _ => cwd.to_path_buf(),
    }
}
