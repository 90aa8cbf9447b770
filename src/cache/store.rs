//! On-disk stage cache store

use crate::error::{StageCacheError, StageCacheResult};
use crate::stage::{CachedVersion, Stage, Version};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of a stage's output tree, both in the work area and the cache
pub const ROOTFS_DIR: &str = "rootfs";

const PARTIAL_SUFFIX: &str = ".partial";

/// Summary of one stage's cache directory
#[derive(Debug, Clone, Serialize)]
pub struct StageCacheEntry {
    pub stage: Stage,
    pub cached: CachedVersion,
    /// Modification time of the version directory, when present
    pub committed_at: Option<DateTime<Utc>>,
}

/// Cache of committed stage outputs
#[derive(Debug, Clone)]
pub struct StageCache {
    root: PathBuf,
}

impl StageCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/stage<N>`
    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    /// `<root>/stage<N>/<version>`
    pub fn entry_dir(&self, stage: Stage, version: &Version) -> PathBuf {
        self.stage_dir(stage).join(version.as_str())
    }

    /// `<root>/stage<N>/<version>/rootfs`
    pub fn rootfs_dir(&self, stage: Stage, version: &Version) -> PathBuf {
        self.entry_dir(stage, version).join(ROOTFS_DIR)
    }

    /// Inspect which version, if any, is cached for `stage`
    pub async fn cached_version(&self, stage: Stage) -> StageCacheResult<CachedVersion> {
        let dir = self.stage_dir(stage);
        let names = match list_entries(&dir).await {
            Ok(names) => names,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache directory for {}", stage);
                return Ok(CachedVersion::Missing);
            }
            Err(e) => {
                return Err(StageCacheError::io(
                    format!("listing cache directory {}", dir.display()),
                    e,
                ))
            }
        };

        let cached = match names.as_slice() {
            [] => CachedVersion::Missing,
            [name] => match name.to_str() {
                Some(name) => CachedVersion::Present(Version::new(name)),
                None => CachedVersion::Ambiguous(1),
            },
            many => CachedVersion::Ambiguous(many.len()),
        };

        debug!("Cache for {}: {}", stage, cached);
        Ok(cached)
    }

    /// Make sure the stage directory exists and holds no entries
    pub async fn reset_stage(&self, stage: Stage) -> StageCacheResult<()> {
        let dir = self.stage_dir(stage);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StageCacheError::io(format!("creating {}", dir.display()), e))?;

        let names = list_entries(&dir)
            .await
            .map_err(|e| StageCacheError::io(format!("listing {}", dir.display()), e))?;

        for name in names {
            let path = dir.join(&name);
            debug!("Removing stale cache entry {}", path.display());
            remove_path(&path).await?;
        }

        Ok(())
    }

    /// `<root>/stage<N>/.<version>.partial`; git ids never start with a dot
    pub fn staging_dir(&self, stage: Stage, version: &Version) -> PathBuf {
        self.stage_dir(stage)
            .join(format!(".{}{}", version.as_str(), PARTIAL_SUFFIX))
    }

    /// Create the empty directory a commit copies into
    pub async fn create_staging(
        &self,
        stage: Stage,
        version: &Version,
    ) -> StageCacheResult<PathBuf> {
        let dir = self.staging_dir(stage, version);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StageCacheError::io(format!("creating {}", dir.display()), e))?;
        Ok(dir)
    }

    /// Give a fully copied staging directory its version name
    pub async fn publish(&self, stage: Stage, version: &Version) -> StageCacheResult<PathBuf> {
        let staging = self.staging_dir(stage, version);
        let entry = self.entry_dir(stage, version);
        fs::rename(&staging, &entry).await.map_err(|e| {
            StageCacheError::io(
                format!("renaming {} to {}", staging.display(), entry.display()),
                e,
            )
        })?;
        debug!("Published {}", entry.display());
        Ok(entry)
    }

    /// Drop everything cached for `stage`
    pub async fn clear_stage(&self, stage: Stage) -> StageCacheResult<bool> {
        let dir = self.stage_dir(stage);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StageCacheError::io(format!("removing {}", dir.display()), e)),
        }
    }

    /// Describe the cache state of the first `count` stages
    pub async fn entries(&self, count: usize) -> StageCacheResult<Vec<StageCacheEntry>> {
        let mut entries = Vec::with_capacity(count);

        for stage in Stage::all(count) {
            let cached = self.cached_version(stage).await?;
            let committed_at = match cached.version() {
                Some(v) => fs::metadata(self.entry_dir(stage, v))
                    .await
                    .and_then(|m| m.modified())
                    .ok()
                    .map(DateTime::<Utc>::from),
                None => None,
            };
            entries.push(StageCacheEntry {
                stage,
                cached,
                committed_at,
            });
        }

        Ok(entries)
    }
}

/// Immediate entry names of a directory
async fn list_entries(dir: &Path) -> std::io::Result<Vec<std::ffi::OsString>> {
    let mut names = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}

async fn remove_path(path: &Path) -> StageCacheResult<()> {
    let meta = fs::symlink_metadata(path)
        .await
        .map_err(|e| StageCacheError::io(format!("inspecting {}", path.display()), e))?;

    let result = if meta.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    result.map_err(|e| StageCacheError::io(format!("removing {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache(dir: &TempDir) -> StageCache {
        StageCache::new(dir.path().join("cache"))
    }

    #[tokio::test]
    async fn missing_dir_is_missing() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        assert_eq!(
            cache.cached_version(Stage::new(0)).await.unwrap(),
            CachedVersion::Missing
        );
    }

    #[tokio::test]
    async fn empty_dir_is_missing() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        std::fs::create_dir_all(cache.stage_dir(Stage::new(1))).unwrap();
        assert_eq!(
            cache.cached_version(Stage::new(1)).await.unwrap(),
            CachedVersion::Missing
        );
    }

    #[tokio::test]
    async fn single_entry_is_present() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let v = Version::new("deadbeef");
        std::fs::create_dir_all(cache.rootfs_dir(Stage::new(0), &v)).unwrap();

        assert_eq!(
            cache.cached_version(Stage::new(0)).await.unwrap(),
            CachedVersion::Present(v)
        );
    }

    #[tokio::test]
    async fn multiple_entries_are_ambiguous() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let stage = Stage::new(2);
        std::fs::create_dir_all(cache.entry_dir(stage, &Version::new("aaa"))).unwrap();
        std::fs::create_dir_all(cache.entry_dir(stage, &Version::new("bbb"))).unwrap();
        std::fs::write(cache.stage_dir(stage).join("notes.txt"), "x").unwrap();

        assert_eq!(
            cache.cached_version(stage).await.unwrap(),
            CachedVersion::Ambiguous(3)
        );
    }

    #[tokio::test]
    async fn reset_removes_dirs_and_files() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let stage = Stage::new(0);
        std::fs::create_dir_all(cache.rootfs_dir(stage, &Version::new("old1"))).unwrap();
        std::fs::create_dir_all(cache.entry_dir(stage, &Version::new("old2"))).unwrap();
        std::fs::write(cache.stage_dir(stage).join("stray"), "x").unwrap();

        cache.reset_stage(stage).await.unwrap();

        assert!(cache.stage_dir(stage).is_dir());
        assert_eq!(std::fs::read_dir(cache.stage_dir(stage)).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn reset_creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        cache.reset_stage(Stage::new(3)).await.unwrap();
        assert!(cache.stage_dir(Stage::new(3)).is_dir());
    }

    #[tokio::test]
    async fn reset_stage_and_publish_leaves_one_version() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let stage = Stage::new(1);
        std::fs::create_dir_all(cache.entry_dir(stage, &Version::new("old"))).unwrap();

        cache.reset_stage(stage).await.unwrap();
        let v = Version::new("new");
        let staging = cache.create_staging(stage, &v).await.unwrap();
        std::fs::create_dir_all(staging.join(ROOTFS_DIR)).unwrap();
        let entry = cache.publish(stage, &v).await.unwrap();

        assert_eq!(entry, cache.entry_dir(stage, &v));
        assert!(!staging.exists());
        assert!(cache.rootfs_dir(stage, &v).is_dir());
        assert_eq!(
            cache.cached_version(stage).await.unwrap(),
            CachedVersion::Present(v)
        );
    }

    #[tokio::test]
    async fn unpublished_staging_never_matches_its_version() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let stage = Stage::new(2);
        let v = Version::new("0123abcd");
        let staging = cache.create_staging(stage, &v).await.unwrap();
        std::fs::create_dir_all(staging.join(ROOTFS_DIR)).unwrap();

        let cached = cache.cached_version(stage).await.unwrap();

        assert!(!cached.matches(&v));
    }

    #[tokio::test]
    async fn clear_stage_reports_removal() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let stage = Stage::new(0);
        std::fs::create_dir_all(cache.entry_dir(stage, &Version::new("v"))).unwrap();

        assert!(cache.clear_stage(stage).await.unwrap());
        assert!(!cache.clear_stage(stage).await.unwrap());
        assert!(!cache.stage_dir(stage).exists());
    }

    #[tokio::test]
    async fn entries_cover_every_stage() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        std::fs::create_dir_all(cache.entry_dir(Stage::new(0), &Version::new("v0"))).unwrap();

        let entries = cache.entries(3).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].cached.is_valid());
        assert!(entries[0].committed_at.is_some());
        assert_eq!(entries[1].cached, CachedVersion::Missing);
        assert!(entries[2].committed_at.is_none());
    }
}
