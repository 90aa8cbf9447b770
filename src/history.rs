//! Change history queries
//!
//! The current version of a stage is the identifier of the most recent
//! commit touching that stage's source directory.

use crate::error::{StageCacheError, StageCacheResult};
use crate::process::{CommandRunner, Invocation};
use crate::stage::{Stage, Version};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Source of per-stage change identifiers
#[async_trait]
pub trait ChangeHistory: Send + Sync {
    /// Identifier of the latest change affecting `stage`
    async fn latest_change(&self, stage: Stage) -> StageCacheResult<Version>;
}

/// Change history backed by `git log` in the source checkout
pub struct GitHistory {
    runner: Arc<dyn CommandRunner>,
    repo_dir: PathBuf,
}

impl GitHistory {
    pub fn new(runner: Arc<dyn CommandRunner>, repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            repo_dir: repo_dir.into(),
        }
    }

    fn log_invocation(&self, stage: Stage) -> Invocation {
        Invocation::new("git")
            .args(["log", "-n", "1", "--pretty=format:%H", "--"])
            .arg(stage.dir_name())
            .current_dir(&self.repo_dir)
    }
}

#[async_trait]
impl ChangeHistory for GitHistory {
    async fn latest_change(&self, stage: Stage) -> StageCacheResult<Version> {
        let output = self
            .runner
            .run(&self.log_invocation(stage))
            .await
            .map_err(|e| StageCacheError::HistoryQuery {
                stage: stage.to_string(),
                reason: e.to_string(),
            })?;

        let hash = output.trim();
        if hash.is_empty() {
            return Err(StageCacheError::HistoryQuery {
                stage: stage.to_string(),
                reason: format!("no commits touch {}", stage.dir_name()),
            });
        }

        debug!("{} is at {}", stage, hash);
        Ok(Version::new(hash))
    }
}
