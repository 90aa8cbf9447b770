//! Per-run working areas of the build tool
//!
//! Each stage has a directory under the work root holding its `rootfs`
//! output, and a skip marker under the marker root telling the build tool
//! to leave the stage alone. With pi-gen the markers live in the source
//! checkout (`<source>/stage<N>/SKIP`) while outputs live under
//! `<source>/work/<image>/stage<N>/rootfs`.

use crate::cache::ROOTFS_DIR;
use crate::error::{StageCacheError, StageCacheResult};
use crate::stage::Stage;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File name of the skip marker
pub const SKIP_MARKER: &str = "SKIP";

/// Working directories used by the external build tool
#[derive(Debug, Clone)]
pub struct Workspace {
    work_root: PathBuf,
    marker_root: PathBuf,
}

impl Workspace {
    pub fn new(work_root: impl Into<PathBuf>, marker_root: impl Into<PathBuf>) -> Self {
        Self {
            work_root: work_root.into(),
            marker_root: marker_root.into(),
        }
    }

    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    /// `<work_root>/stage<N>`
    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.work_root.join(stage.dir_name())
    }

    /// `<work_root>/stage<N>/rootfs`
    pub fn rootfs_dir(&self, stage: Stage) -> PathBuf {
        self.stage_dir(stage).join(ROOTFS_DIR)
    }

    /// `<marker_root>/stage<N>/SKIP`
    pub fn marker_path(&self, stage: Stage) -> PathBuf {
        self.marker_root.join(stage.dir_name()).join(SKIP_MARKER)
    }

    pub fn is_marked_skip(&self, stage: Stage) -> bool {
        self.marker_path(stage).is_file()
    }

    /// Tell the build tool not to rebuild `stage`
    pub async fn mark_skip(&self, stage: Stage) -> StageCacheResult<()> {
        let marker = self.marker_path(stage);
        if let Some(parent) = marker.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StageCacheError::io(format!("creating {}", parent.display()), e))?;
        }
        fs::write(&marker, b"")
            .await
            .map_err(|e| StageCacheError::io(format!("writing {}", marker.display()), e))?;
        debug!("Placed {}", marker.display());
        Ok(())
    }

    /// Remove a skip marker left behind by an earlier run
    pub async fn clear_skip(&self, stage: Stage) -> StageCacheResult<()> {
        let marker = self.marker_path(stage);
        match fs::remove_file(&marker).await {
            Ok(()) => {
                debug!("Removed stale {}", marker.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StageCacheError::io(
                format!("removing {}", marker.display()),
                e,
            )),
        }
    }

    /// Create the stage directory and drop any previous `rootfs` so a
    /// seed copy lands at `<stage>/rootfs` rather than inside it
    pub async fn prepare_seed(&self, stage: Stage) -> StageCacheResult<PathBuf> {
        let dir = self.stage_dir(stage);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StageCacheError::io(format!("creating {}", dir.display()), e))?;

        let rootfs = self.rootfs_dir(stage);
        match fs::remove_dir_all(&rootfs).await {
            Ok(()) => debug!("Removed previous {}", rootfs.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StageCacheError::io(
                    format!("removing {}", rootfs.display()),
                    e,
                ))
            }
        }

        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::new(dir.path().join("work"), dir.path().join("src"))
    }

    #[test]
    fn layout() {
        let ws = Workspace::new("/w", "/s");
        assert_eq!(ws.rootfs_dir(Stage::new(1)), PathBuf::from("/w/stage1/rootfs"));
        assert_eq!(ws.marker_path(Stage::new(1)), PathBuf::from("/s/stage1/SKIP"));
    }

    #[tokio::test]
    async fn mark_and_clear_skip() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        let stage = Stage::new(0);

        ws.mark_skip(stage).await.unwrap();
        assert!(ws.is_marked_skip(stage));

        ws.clear_skip(stage).await.unwrap();
        assert!(!ws.is_marked_skip(stage));

        // Clearing an absent marker is fine
        ws.clear_skip(stage).await.unwrap();
    }

    #[tokio::test]
    async fn prepare_seed_removes_old_rootfs() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        let stage = Stage::new(2);
        std::fs::create_dir_all(ws.rootfs_dir(stage).join("etc")).unwrap();
        std::fs::write(ws.stage_dir(stage).join("keep.log"), "x").unwrap();

        let stage_dir = ws.prepare_seed(stage).await.unwrap();

        assert_eq!(stage_dir, ws.stage_dir(stage));
        assert!(!ws.rootfs_dir(stage).exists());
        assert!(stage_dir.join("keep.log").exists());
    }

    #[tokio::test]
    async fn prepare_seed_creates_stage_dir() {
        let dir = TempDir::new().unwrap();
        let ws = workspace(&dir);
        let stage_dir = ws.prepare_seed(Stage::new(0)).await.unwrap();
        assert!(stage_dir.is_dir());
    }
}
