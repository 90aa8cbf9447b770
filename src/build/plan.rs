//! Skip/rebuild decisions for a run

use crate::stage::{CachedVersion, Stage, Version};
use serde::Serialize;
use std::fmt;

/// Outcome of comparing one stage's versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCheck {
    pub stage: Stage,
    pub current: Version,
    pub cached: CachedVersion,
}

impl StageCheck {
    pub fn is_unchanged(&self) -> bool {
        self.cached.matches(&self.current)
    }
}

/// What happens to a stage in this run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageDecision {
    /// Output restored from cache, build tool skips it
    Skip,
    /// Rebuilt and committed to the cache
    Build,
}

impl fmt::Display for StageDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Build => write!(f, "build"),
        }
    }
}

/// Cached output copied into the working area before the build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    /// Stage 0 is rebuilt from raw inputs
    None,
    /// The first rebuilt stage starts from the previous stage's cached rootfs
    FromPrevious {
        target: Stage,
        source: Stage,
        version: Version,
    },
    /// Nothing is rebuilt; the last stage's own cached rootfs is restored
    Restore { stage: Stage, version: Version },
}

/// Result of scanning the stages
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    stage_count: usize,
    checks: Vec<StageCheck>,
    first_stage_to_build: usize,
}

impl BuildPlan {
    /// Derive the plan from the checks of a scan that stopped at the first
    /// changed stage
    pub fn from_checks(stage_count: usize, checks: Vec<StageCheck>) -> Self {
        let first_stage_to_build = checks
            .iter()
            .position(|check| !check.is_unchanged())
            .unwrap_or(stage_count);

        Self {
            stage_count,
            checks,
            first_stage_to_build,
        }
    }

    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    /// Index of the first rebuilt stage; `stage_count` if nothing is rebuilt
    pub fn first_stage_to_build(&self) -> usize {
        self.first_stage_to_build
    }

    /// Versions compared during the scan, in stage order
    pub fn checks(&self) -> &[StageCheck] {
        &self.checks
    }

    pub fn check(&self, stage: Stage) -> Option<&StageCheck> {
        self.checks.get(stage.index())
    }

    pub fn is_fully_cached(&self) -> bool {
        self.first_stage_to_build >= self.stage_count
    }

    pub fn decision(&self, stage: Stage) -> StageDecision {
        if stage.index() < self.first_stage_to_build {
            StageDecision::Skip
        } else {
            StageDecision::Build
        }
    }

    pub fn skipped(&self) -> impl Iterator<Item = Stage> {
        Stage::all(self.first_stage_to_build.min(self.stage_count))
    }

    pub fn rebuilt(&self) -> impl Iterator<Item = Stage> {
        (self.first_stage_to_build..self.stage_count).map(Stage::new)
    }

    /// Which cached rootfs to place in the working area before building
    pub fn seed(&self) -> Seed {
        if self.is_fully_cached() {
            return match self.checks.last().and_then(|c| c.cached.version().map(|v| (c, v))) {
                Some((check, version)) => Seed::Restore {
                    stage: check.stage,
                    version: version.clone(),
                },
                None => Seed::None,
            };
        }

        let target = Stage::new(self.first_stage_to_build);
        let previous = target
            .previous()
            .and_then(|source| self.check(source))
            .and_then(|check| check.cached.version().map(|v| (check.stage, v.clone())));

        match previous {
            Some((source, version)) => Seed::FromPrevious {
                target,
                source,
                version,
            },
            None => Seed::None,
        }
    }
}
