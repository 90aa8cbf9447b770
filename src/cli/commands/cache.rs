//! Cache command - inspect or clear the stage cache

use crate::cache::{StageCache, StageCacheEntry};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::cli::RunContext;
use crate::error::{StageCacheError, StageCacheResult};
use crate::privilege;
use crate::stage::Stage;
use crate::ui::{self, UiContext};
use tracing::debug;

/// Execute the cache command
pub async fn execute(args: CacheArgs, ctx: &RunContext) -> StageCacheResult<()> {
    let settings = ctx.settings()?;
    let cache = StageCache::new(&settings.cache_dir);

    match args.action {
        CacheAction::List { format } => list_cache(&cache, settings.stage_count, format).await,
        CacheAction::Clear { stage, yes } => {
            clear_cache(&cache, settings.stage_count, stage, yes).await
        }
    }
}

async fn list_cache(
    cache: &StageCache,
    stage_count: usize,
    format: OutputFormat,
) -> StageCacheResult<()> {
    let entries = cache.entries(stage_count).await?;

    match format {
        OutputFormat::Table => print_cache_table(cache, &entries),
        OutputFormat::Json => print_cache_json(&entries)?,
        OutputFormat::Plain => print_cache_plain(&entries),
    }

    Ok(())
}

fn print_cache_table(cache: &StageCache, entries: &[StageCacheEntry]) {
    println!("Cache: {}", cache.root().display());
    println!();
    println!("{:<10} {:<20} {:<20}", "STAGE", "VERSION", "COMMITTED");
    println!("{}", "-".repeat(50));

    for entry in entries {
        let committed = entry
            .committed_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<10} {:<20} {:<20}",
            entry.stage.to_string(),
            ui::styled_cached(&entry.cached).to_string(),
            committed
        );
    }

    let valid = entries.iter().filter(|e| e.cached.is_valid()).count();
    println!();
    println!("{} of {} stage(s) cached", valid, entries.len());
}

fn print_cache_json(entries: &[StageCacheEntry]) -> StageCacheResult<()> {
    println!("{}", serde_json::to_string_pretty(entries)?);
    Ok(())
}

fn print_cache_plain(entries: &[StageCacheEntry]) {
    for entry in entries {
        match entry.cached.version() {
            Some(v) => println!("{} {}", entry.stage, v),
            None => println!("{} -", entry.stage),
        }
    }
}

async fn clear_cache(
    cache: &StageCache,
    stage_count: usize,
    stage: Option<usize>,
    yes: bool,
) -> StageCacheResult<()> {
    let targets: Vec<Stage> = match stage {
        Some(index) if index >= stage_count => {
            return Err(StageCacheError::InvalidStage {
                stage: index,
                count: stage_count,
            })
        }
        Some(index) => vec![Stage::new(index)],
        None => Stage::all(stage_count).collect(),
    };

    privilege::ensure_root()?;

    let ctx = UiContext::detect().with_auto_yes(yes);
    let what = match stage {
        Some(index) => format!("stage{}", index),
        None => format!("all {} stage(s)", stage_count),
    };
    let message = format!("Clear cached {} in {}?", what, cache.root().display());

    if !ui::confirm(&ctx, &message, false).await? {
        ui::step_warn_hint(&ctx, "Nothing cleared", "Pass --yes to skip confirmation");
        return Ok(());
    }

    let mut cleared = 0;
    for target in targets {
        if cache.clear_stage(target).await? {
            debug!("Cleared {}", target);
            cleared += 1;
        }
    }

    ui::step_ok(&ctx, &format!("Cleared {} cached stage(s)", cleared));
    Ok(())
}
