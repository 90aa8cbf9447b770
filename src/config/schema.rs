//! Configuration schema for stagecache
//!
//! Configuration is read from `stagecache.toml` next to the build tree, or
//! from `~/.config/stagecache/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Directory layout
    pub paths: PathsConfig,

    /// Build tool invocation
    pub build: BuildConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Directory layout
///
/// Relative paths are resolved against `source_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Build tree holding `stage<N>` sources (defaults to the current directory)
    pub source_dir: Option<PathBuf>,

    /// Where the build tool writes `stage<N>/rootfs`
    pub work_dir: PathBuf,

    /// Where skip markers go (defaults to `work_dir`)
    pub marker_dir: Option<PathBuf>,

    /// Persistent stage cache root
    pub cache_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: None,
            work_dir: PathBuf::from("work/raspios-bookworm-arm64"),
            marker_dir: None,
            cache_dir: PathBuf::from("/var/cache/stagecache"),
        }
    }
}

/// Build tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of stages in the pipeline
    pub stage_count: usize,

    /// Command line of the build tool, run from `source_dir`
    pub command: Vec<String>,

    /// Environment variable carrying the clean/resume flag
    pub clean_var: String,

    /// Extra environment variables for the build tool
    pub env: BTreeMap<String, String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            stage_count: 4,
            command: vec!["./build.sh".to_string()],
            clean_var: "CLEAN".to_string(),
            env: BTreeMap::new(),
        }
    }
}
