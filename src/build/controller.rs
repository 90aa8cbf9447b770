//! Stage cache controller
//!
//! Drives one run of the build tool:
//!
//! 1. Scan stages in order until the first one whose current version
//!    differs from its cached version.
//! 2. Mark every stage before it as skipped and seed its working area
//!    from the previous stage's cache (or restore the last stage when
//!    everything is cached).
//! 3. Run the build tool once.
//! 4. Commit every rebuilt stage's rootfs into the cache under its
//!    current version.
//!
//! Failures abort immediately. A commit that fails midway leaves only an
//! unpublished staging directory, which never matches a version, so the
//! stage is rebuilt on the next run.

use crate::build::oracle::VersionOracle;
use crate::build::plan::{BuildPlan, Seed, StageCheck};
use crate::build::settings::{BuildMode, BuildSettings};
use crate::cache::StageCache;
use crate::error::StageCacheResult;
use crate::history::{ChangeHistory, GitHistory};
use crate::process::{CommandRunner, Invocation};
use crate::stage::{Stage, Version};
use crate::workspace::Workspace;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Progress notifications emitted during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    Skipped(Stage),
    Seeding { target: Stage, source: Stage },
    Restoring(Stage),
    BuildStarted,
    BuildFinished,
    Committing(Stage),
    Committed { stage: Stage, version: Version },
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub plan: BuildPlan,
    pub committed: Vec<(Stage, Version)>,
}

/// Decides which stages to skip and moves rootfs trees in and out of the
/// cache around a single build tool invocation
pub struct StageCacheController {
    settings: BuildSettings,
    runner: Arc<dyn CommandRunner>,
    oracle: VersionOracle,
    cache: StageCache,
    workspace: Workspace,
}

impl StageCacheController {
    pub fn new(
        settings: BuildSettings,
        runner: Arc<dyn CommandRunner>,
        history: Arc<dyn ChangeHistory>,
    ) -> Self {
        let cache = StageCache::new(&settings.cache_dir);
        let workspace = Workspace::new(&settings.work_dir, &settings.marker_dir);
        Self {
            oracle: VersionOracle::new(history, cache.clone()),
            settings,
            runner,
            cache,
            workspace,
        }
    }

    /// Controller reading stage versions from git history of the source tree
    pub fn with_git(settings: BuildSettings, runner: Arc<dyn CommandRunner>) -> Self {
        let history = Arc::new(GitHistory::new(runner.clone(), &settings.source_dir));
        Self::new(settings, runner, history)
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub fn cache(&self) -> &StageCache {
        &self.cache
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Compare versions stage by stage, stopping at the first change
    pub async fn plan(&self) -> StageCacheResult<BuildPlan> {
        let mut checks = Vec::new();

        for stage in Stage::all(self.settings.stage_count) {
            let current = self.oracle.current_version(stage).await?;
            let cached = self.oracle.cached_version(stage).await?;
            info!("{}: source at {}, cache at {}", stage, current, cached);

            let check = StageCheck {
                stage,
                current,
                cached,
            };
            let changed = !check.is_unchanged();
            checks.push(check);

            // Later stages derive from this one and are rebuilt regardless
            if changed {
                break;
            }
        }

        let plan = BuildPlan::from_checks(self.settings.stage_count, checks);
        debug!("First stage to build: {}", plan.first_stage_to_build());
        Ok(plan)
    }

    /// Plan and execute a full run
    pub async fn run(
        &self,
        mode: BuildMode,
        on_event: &dyn Fn(BuildEvent),
    ) -> StageCacheResult<BuildReport> {
        let plan = self.plan().await?;
        self.execute(plan, mode, on_event).await
    }

    /// Execute a previously computed plan
    pub async fn execute(
        &self,
        plan: BuildPlan,
        mode: BuildMode,
        on_event: &dyn Fn(BuildEvent),
    ) -> StageCacheResult<BuildReport> {
        self.place_markers(&plan, on_event).await?;
        self.seed(&plan, on_event).await?;

        on_event(BuildEvent::BuildStarted);
        let invocation = self.settings.build_invocation(mode)?;
        info!("Starting build: {}", invocation);
        self.runner.execute(&invocation).await?;
        on_event(BuildEvent::BuildFinished);

        let mut committed = Vec::new();
        for stage in plan.rebuilt() {
            on_event(BuildEvent::Committing(stage));
            let version = self.commit(stage).await?;
            on_event(BuildEvent::Committed {
                stage,
                version: version.clone(),
            });
            committed.push((stage, version));
        }

        Ok(BuildReport { plan, committed })
    }

    async fn place_markers(
        &self,
        plan: &BuildPlan,
        on_event: &dyn Fn(BuildEvent),
    ) -> StageCacheResult<()> {
        for stage in plan.skipped() {
            info!("Skipping {}", stage);
            self.workspace.mark_skip(stage).await?;
            on_event(BuildEvent::Skipped(stage));
        }
        for stage in plan.rebuilt() {
            self.workspace.clear_skip(stage).await?;
        }
        Ok(())
    }

    async fn seed(
        &self,
        plan: &BuildPlan,
        on_event: &dyn Fn(BuildEvent),
    ) -> StageCacheResult<()> {
        match plan.seed() {
            Seed::None => {
                debug!("Nothing to seed, building from scratch");
            }
            Seed::FromPrevious {
                target,
                source,
                version,
            } => {
                info!("Loading {} as starting point for {}", source, target);
                on_event(BuildEvent::Seeding { target, source });
                let dest = self.workspace.prepare_seed(target).await?;
                self.copy_tree(&self.cache.rootfs_dir(source, &version), &dest)
                    .await?;
            }
            Seed::Restore { stage, version } => {
                info!("All stages cached, restoring {}", stage);
                on_event(BuildEvent::Restoring(stage));
                let dest = self.workspace.prepare_seed(stage).await?;
                self.copy_tree(&self.cache.rootfs_dir(stage, &version), &dest)
                    .await?;
            }
        }
        Ok(())
    }

    /// Store the freshly built rootfs of `stage` as its only cache entry
    async fn commit(&self, stage: Stage) -> StageCacheResult<Version> {
        info!("Storing rootfs of {}", stage);

        // Recomputed per stage so the next scan compares like with like
        let version = self.oracle.current_version(stage).await?;

        self.cache.reset_stage(stage).await?;
        let staging = self.cache.create_staging(stage, &version).await?;
        self.copy_tree(&self.workspace.rootfs_dir(stage), &staging)
            .await?;
        self.cache.publish(stage, &version).await?;

        debug!("Committed {} at {}", stage, version);
        Ok(version)
    }

    /// Copy the directory `src` into `dest_dir`, preserving ownership,
    /// modes, links and device nodes
    async fn copy_tree(&self, src: &Path, dest_dir: &Path) -> StageCacheResult<()> {
        debug!("Copying {} into {}", src.display(), dest_dir.display());
        let invocation = Invocation::new("cp")
            .arg("-a")
            .path_arg(src)
            .path_arg(dest_dir);
        self.runner.run(&invocation).await?;
        Ok(())
    }
}
