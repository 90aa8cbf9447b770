//! Current and cached stage versions

use crate::cache::StageCache;
use crate::error::StageCacheResult;
use crate::history::ChangeHistory;
use crate::stage::{CachedVersion, Stage, Version};
use std::sync::Arc;

/// Answers which version a stage is at, in source and in the cache
///
/// Both lookups are reads. A failed history query is returned as an
/// error; there is no fallback version.
#[derive(Clone)]
pub struct VersionOracle {
    history: Arc<dyn ChangeHistory>,
    cache: StageCache,
}

impl VersionOracle {
    pub fn new(history: Arc<dyn ChangeHistory>, cache: StageCache) -> Self {
        Self { history, cache }
    }

    pub async fn current_version(&self, stage: Stage) -> StageCacheResult<Version> {
        self.history.latest_change(stage).await
    }

    pub async fn cached_version(&self, stage: Stage) -> StageCacheResult<CachedVersion> {
        self.cache.cached_version(stage).await
    }
}
