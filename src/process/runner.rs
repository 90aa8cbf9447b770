//! Process runner abstraction
//!
//! Every external program the driver starts goes through this trait, so
//! the build logic can be exercised with a recording fake.

use crate::error::StageCacheResult;
use crate::process::invocation::Invocation;
use async_trait::async_trait;

/// Abstract interface for running external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and return its stdout
    ///
    /// A nonzero exit status is an error.
    async fn run(&self, invocation: &Invocation) -> StageCacheResult<String>;

    /// Run a command with output streamed to the terminal
    ///
    /// A nonzero exit status is an error.
    async fn execute(&self, invocation: &Invocation) -> StageCacheResult<()>;
}
