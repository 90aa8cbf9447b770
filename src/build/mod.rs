//! Stage-level incremental build driver
//!
//! The `VersionOracle` tells which version each stage is at in source
//! and in the cache; the `StageCacheController` turns that into a
//! `BuildPlan`, runs the build tool once and commits rebuilt stages.

mod controller;
mod oracle;
mod plan;
mod settings;

pub use controller::{BuildEvent, BuildReport, StageCacheController};
pub use oracle::VersionOracle;
pub use plan::{BuildPlan, Seed, StageCheck, StageDecision};
pub use settings::{BuildMode, BuildSettings};
