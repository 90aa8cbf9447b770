//! Status command - show the plan without touching anything

use crate::build::{BuildPlan, StageCacheController, StageDecision};
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::cli::RunContext;
use crate::error::StageCacheResult;
use crate::process::NativeRunner;
use crate::stage::{CachedVersion, Stage};
use crate::ui;
use serde::Serialize;
use std::sync::Arc;

/// Execute the status command
pub async fn execute(args: StatusArgs, ctx: &RunContext) -> StageCacheResult<()> {
    let controller =
        StageCacheController::with_git(ctx.settings()?, Arc::new(NativeRunner::new()));
    let plan = controller.plan().await?;

    match args.format {
        OutputFormat::Table => print_table(&plan),
        OutputFormat::Json => print_json(&plan)?,
        OutputFormat::Plain => print_plain(&plan),
    }

    Ok(())
}

/// One row of the status output
#[derive(Debug, Serialize)]
struct StageRow {
    stage: Stage,
    decision: StageDecision,
    current: Option<String>,
    cached: Option<String>,
    cache_state: &'static str,
}

fn rows(plan: &BuildPlan) -> Vec<StageRow> {
    Stage::all(plan.stage_count())
        .map(|stage| {
            let check = plan.check(stage);
            StageRow {
                stage,
                decision: plan.decision(stage),
                current: check.map(|c| c.current.to_string()),
                cached: check.and_then(|c| c.cached.version().map(|v| v.to_string())),
                cache_state: match check.map(|c| &c.cached) {
                    Some(CachedVersion::Present(_)) => "present",
                    Some(CachedVersion::Missing) => "missing",
                    Some(CachedVersion::Ambiguous(_)) => "ambiguous",
                    None => "unchecked",
                },
            }
        })
        .collect()
}

fn print_table(plan: &BuildPlan) {
    println!(
        "{:<10} {:<10} {:<14} {:<20}",
        "STAGE", "DECISION", "SOURCE", "CACHE"
    );
    println!("{}", "-".repeat(56));

    for stage in Stage::all(plan.stage_count()) {
        let (current, cached) = match plan.check(stage) {
            Some(check) => (
                check.current.short().to_string(),
                ui::styled_cached(&check.cached).to_string(),
            ),
            // Downstream of a change, never compared
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:<10} {:<10} {:<14} {:<20}",
            stage.to_string(),
            ui::styled_decision(plan.decision(stage)).to_string(),
            current,
            cached
        );
    }

    println!();
    if plan.is_fully_cached() {
        println!("All {} stage(s) cached", plan.stage_count());
    } else {
        println!(
            "Rebuild starts at stage{} ({} of {} stage(s))",
            plan.first_stage_to_build(),
            plan.rebuilt().count(),
            plan.stage_count()
        );
    }
}

fn print_json(plan: &BuildPlan) -> StageCacheResult<()> {
    #[derive(Serialize)]
    struct StatusJson {
        stage_count: usize,
        first_stage_to_build: usize,
        stages: Vec<StageRow>,
    }

    let status = StatusJson {
        stage_count: plan.stage_count(),
        first_stage_to_build: plan.first_stage_to_build(),
        stages: rows(plan),
    };
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn print_plain(plan: &BuildPlan) {
    for stage in Stage::all(plan.stage_count()) {
        println!("{} {}", stage, plan.decision(stage));
    }
}
