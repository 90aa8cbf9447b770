//! Configuration management for stagecache

pub mod schema;

pub use schema::Config;

use crate::error::{StageCacheError, StageCacheResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name of a config placed next to the build tree
pub const LOCAL_CONFIG_FILE: &str = "stagecache.toml";

/// Locates, reads and writes one config file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `~/.config/stagecache/config.toml` or the platform equivalent
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stagecache")
            .join("config.toml")
    }

    /// Nearest `stagecache.toml` in `start` or one of its ancestors
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Parsed file, or defaults when there is no file
    pub async fn load(&self) -> StageCacheResult<Config> {
        match self.read().await? {
            Some(content) => self.parse(&content),
            None => {
                debug!("No config at {}, using defaults", self.config_path.display());
                Ok(Config::default())
            }
        }
    }

    /// Parsed file; a missing file is an error
    pub async fn load_required(&self) -> StageCacheResult<Config> {
        match self.read().await? {
            Some(content) => self.parse(&content),
            None => Err(StageCacheError::ConfigNotFound(self.config_path.clone())),
        }
    }

    async fn read(&self) -> StageCacheResult<Option<String>> {
        match fs::read_to_string(&self.config_path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StageCacheError::io(
                format!("reading config from {}", self.config_path.display()),
                e,
            )),
        }
    }

    fn parse(&self, content: &str) -> StageCacheResult<Config> {
        toml::from_str(content).map_err(|e| StageCacheError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config`, replacing the file in one rename
    pub async fn save(&self, config: &Config) -> StageCacheResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StageCacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        let staging = self.config_path.with_extension("toml.tmp");
        fs::write(&staging, content)
            .await
            .map_err(|e| StageCacheError::io(format!("writing {}", staging.display()), e))?;
        fs::rename(&staging, &self.config_path).await.map_err(|e| {
            StageCacheError::io(format!("replacing {}", self.config_path.display()), e)
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}
