//! Error types for stagecache
//!
//! Every fallible operation returns `StageCacheResult<T>`. Nothing is
//! retried: the first error aborts the run and is reported by `main`
//! together with its `hint()`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stagecache operations
pub type StageCacheResult<T> = Result<T, StageCacheError>;

#[derive(Error, Debug)]
pub enum StageCacheError {
    #[error("Must be run as root")]
    NotRoot,

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Cannot create config directory {path}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Stage {stage} out of range, pipeline has {count} stage(s)")]
    InvalidStage { stage: usize, count: usize },

    /// The change history could not name a version for a stage
    #[error("Cannot determine current version of {stage}: {reason}")]
    HistoryQuery { stage: String, reason: String },

    /// The build tool itself exited non-zero
    #[error("Build tool `{command}` exited with status {code}")]
    BuildFailed { command: String, code: i32 },

    #[error("Failed {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A helper program could not be started at all
    #[error("Cannot start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A helper program (git, cp) ran and failed
    #[error("`{command}` exited with status {code}: {stderr}")]
    CommandExit {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot serialize configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl StageCacheError {
    /// IO error with a description of what was being done
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    pub fn command_exit(command: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        Self::CommandExit {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Suggested next step, printed under the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotRoot => Some("Run with sudo"),
            Self::HistoryQuery { .. } => Some(
                "Check that source_dir is a git checkout and every stage directory is committed",
            ),
            Self::BuildFailed { .. } => {
                Some("Fix the build and rerun; stages that were not committed will be rebuilt")
            }
            Self::ConfigNotFound(_) => Some("Run: stagecache config init"),
            Self::InvalidStage { .. } => Some("Run: stagecache cache list"),
            Self::Spawn { .. } => Some("Check that git and cp are installed and on PATH"),
            _ => None,
        }
    }
}
