//! Build command - restore cached stages, run the build, cache the result

use crate::build::{BuildEvent, BuildMode, StageCacheController};
use crate::cli::args::BuildArgs;
use crate::cli::RunContext;
use crate::error::StageCacheResult;
use crate::process::NativeRunner;
use crate::ui::{self, TaskSpinner, UiContext};
use std::cell::RefCell;
use std::sync::Arc;
use std::time::Instant;

/// Execute the build command
///
/// The caller has already checked for root.
pub async fn execute(args: BuildArgs, ctx: &RunContext) -> StageCacheResult<()> {
    let ui_ctx = UiContext::detect();
    let settings = ctx.settings()?;
    let controller = StageCacheController::with_git(settings, Arc::new(NativeRunner::new()));

    ui::intro(&ui_ctx, "stagecache build");
    ui::key_value(&ui_ctx, "Build tree", &ctx.source_dir.display().to_string());
    ui::key_value(
        &ui_ctx,
        "Cache",
        &controller.cache().root().display().to_string(),
    );

    let plan = controller.plan().await?;
    for check in plan.checks() {
        if check.is_unchanged() {
            ui::step_skip(&ui_ctx, &check.stage.to_string(), check.current.short());
        } else {
            ui::step_info(
                &ui_ctx,
                &format!(
                    "{} changed: source at {}, cache {}",
                    check.stage,
                    check.current.short(),
                    check.cached
                ),
            );
        }
    }

    let mode = if args.resume {
        BuildMode::Resume
    } else {
        BuildMode::Clean
    };

    let started = Instant::now();
    let spinner = RefCell::new(TaskSpinner::new(&ui_ctx));
    let on_event = |event: BuildEvent| {
        let mut spinner = spinner.borrow_mut();
        match event {
            BuildEvent::Seeding { target, source } => ui::step_info(
                &ui_ctx,
                &format!("Loading {} as starting point for {}", source, target),
            ),
            BuildEvent::Restoring(stage) => {
                ui::step_info(&ui_ctx, &format!("All stages cached, restoring {}", stage))
            }
            BuildEvent::BuildStarted => ui::section(&ui_ctx, "Starting build"),
            BuildEvent::BuildFinished => ui::step_ok_detail(
                &ui_ctx,
                "Build finished",
                &format!("{}s", started.elapsed().as_secs()),
            ),
            BuildEvent::Committing(stage) => {
                spinner.start(&format!("Storing rootfs of {}", stage));
            }
            BuildEvent::Committed { stage, version } => {
                spinner.stop(&format!("{} cached at {}", stage, version.short()));
            }
            BuildEvent::Skipped(_) => {}
        }
    };

    let result = controller.execute(plan, mode, &on_event).await;
    let mut spinner = spinner.into_inner();
    if result.is_err() && spinner.is_running() {
        spinner.stop_error("Caching failed");
    }
    let report = result?;

    let summary = if report.committed.is_empty() {
        "All stages were cached, nothing rebuilt".to_string()
    } else {
        format!("Rebuilt and cached {} stage(s)", report.committed.len())
    };
    ui::outro_success(&ui_ctx, &summary);

    Ok(())
}
