//! Confirmation prompts

use super::context::UiContext;
use crate::error::{StageCacheError, StageCacheResult};

/// Ask a yes/no question
///
/// `--yes` answers yes without asking; a non-interactive session takes
/// `default`.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> StageCacheResult<bool> {
    match (ctx.auto_yes(), ctx.is_interactive()) {
        (true, _) => {
            println!("  {} (--yes)", message);
            Ok(true)
        }
        (false, false) => Ok(default),
        (false, true) => {
            let message = message.to_string();
            // cliclack reads stdin synchronously
            tokio::task::spawn_blocking(move || {
                cliclack::confirm(message).initial_value(default).interact()
            })
            .await
            .map_err(|e| StageCacheError::Prompt(e.to_string()))?
            .map_err(|e| StageCacheError::Prompt(e.to_string()))
        }
    }
}
