//! stagecache - incremental stage cache for multi-stage image builds
//!
//! Keeps a committed copy of every stage's root filesystem, keyed by the
//! last commit that touched the stage sources. On each run only the first
//! changed stage and everything after it is rebuilt; earlier stages are
//! skipped and the first rebuilt stage is seeded from the cache.

pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod privilege;
pub mod process;
pub mod stage;
pub mod ui;
pub mod workspace;

pub use error::{StageCacheError, StageCacheResult};
