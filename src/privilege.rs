//! Privilege precondition
//!
//! Copying rootfs trees preserves ownership and device nodes, which only
//! works as root.

use crate::error::{StageCacheError, StageCacheResult};
use nix::unistd::Uid;

/// Whether the process runs with an effective uid of 0
pub fn is_root() -> bool {
    Uid::effective().is_root()
}

/// Fail unless running as root
pub fn ensure_root() -> StageCacheResult<()> {
    if is_root() {
        Ok(())
    } else {
        Err(StageCacheError::NotRoot)
    }
}
