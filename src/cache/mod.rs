//! Persistent per-stage build cache
//!
//! Each stage owns one directory under the cache root holding at most
//! one version subdirectory, named after the change that produced it:
//!
//! ```text
//! <cache_root>/
//!   stage0/<version>/rootfs/
//!   stage1/<version>/rootfs/
//!   ...
//! ```
//!
//! # Entry States
//!
//! | Entries | State | Effect |
//! |---------|-------|--------|
//! | none / no dir | Missing | stage is rebuilt |
//! | exactly one | Present | reused if it matches the current version |
//! | more than one | Ambiguous | stage is rebuilt |
//!
//! A commit copies into `.<version>.partial` and renames it to `<version>`
//! only after the copy succeeded. A leftover partial directory never equals
//! a version, so an interrupted commit is rebuilt on the next run.
//!
//! The store performs no locking. Only one build may use a cache root at
//! a time; wrap concurrent callers in an external lock (e.g. `flock`).

pub mod store;

pub use store::{StageCache, StageCacheEntry, ROOTFS_DIR};
