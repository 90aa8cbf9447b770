//! Native process runner
//!
//! Implements `CommandRunner` with `tokio::process::Command`.

use crate::error::{StageCacheError, StageCacheResult};
use crate::process::build_error_output;
use crate::process::invocation::Invocation;
use crate::process::runner::CommandRunner;
use async_trait::async_trait;
use std::io::Write;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs commands directly on the host
pub struct NativeRunner;

impl NativeRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).envs(&invocation.env);
        if let Some(ref dir) = invocation.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl Default for NativeRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for NativeRunner {
    async fn run(&self, invocation: &Invocation) -> StageCacheResult<String> {
        debug!("Executing: {}", invocation);

        let output = Self::command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| StageCacheError::spawn(invocation.to_string(), e))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(StageCacheError::command_exit(
                invocation.to_string(),
                output.status.code().unwrap_or(-1),
                build_error_output(&stdout, &stderr),
            ))
        }
    }

    async fn execute(&self, invocation: &Invocation) -> StageCacheResult<()> {
        debug!("Executing interactively: {}", invocation);

        // Anything we printed must land before the child's output
        std::io::stdout().flush().ok();

        let status = Self::command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| StageCacheError::spawn(invocation.to_string(), e))?;

        if status.success() {
            Ok(())
        } else {
            Err(StageCacheError::BuildFailed {
                command: invocation.to_string(),
                code: status.code().unwrap_or(-1),
            })
        }
    }
}
