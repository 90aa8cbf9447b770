//! Status lines for the build log
//!
//! On a terminal every line goes through `cliclack::log`. Otherwise a
//! bracketed tag is printed so the lines stay greppable in captured logs.

use super::context::UiContext;
use crate::build::StageDecision;
use crate::stage::CachedVersion;
use console::{style, StyledObject};

#[derive(Debug, Clone, Copy)]
enum Tone {
    Ok,
    Info,
    Skip,
    Warn,
}

impl Tone {
    fn tag(self) -> StyledObject<&'static str> {
        match self {
            Self::Ok => style("[OK]").green(),
            Self::Info => style("[INFO]").cyan(),
            Self::Skip => style("[SKIP]").dim(),
            Self::Warn => style("[WARN]").yellow(),
        }
    }
}

fn emit(ctx: &UiContext, tone: Tone, message: String) {
    if !ctx.use_fancy_output() {
        println!("  {} {}", tone.tag(), message);
        return;
    }
    let shown = match tone {
        Tone::Ok => cliclack::log::success(message),
        Tone::Info => cliclack::log::info(message),
        Tone::Skip => cliclack::log::remark(message),
        Tone::Warn => cliclack::log::warning(message),
    };
    // Terminal gone; nothing useful left to do with the line
    shown.ok();
}

pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).cyan().bold());
    }
}

pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!("{} {}", style("[DONE]").green().bold(), message);
    }
}

/// Header before a long phase such as the build tool run
pub fn section(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::step(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    emit(ctx, Tone::Ok, message.to_string());
}

pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    emit(ctx, Tone::Ok, format!("{} ({})", message, style(detail).dim()));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    emit(ctx, Tone::Info, message.to_string());
}

/// A stage whose source matches its cache
pub fn step_skip(ctx: &UiContext, stage: &str, version: &str) {
    emit(ctx, Tone::Skip, format!("{} unchanged at {}", stage, version));
}

pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    emit(ctx, Tone::Warn, format!("{} - {}", message, style(hint).dim()));
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    let key = if ctx.use_fancy_output() {
        style(key).dim()
    } else {
        style(key)
    };
    println!("  {}: {}", key, value);
}

pub fn styled_decision(decision: StageDecision) -> StyledObject<String> {
    let text = decision.to_string();
    match decision {
        StageDecision::Skip => style(text).green(),
        StageDecision::Build => style(text).yellow(),
    }
}

/// Short version, or the reason there is none
pub fn styled_cached(cached: &CachedVersion) -> StyledObject<String> {
    match cached {
        CachedVersion::Present(v) => style(v.short().to_string()),
        CachedVersion::Missing => style("missing".to_string()).dim(),
        CachedVersion::Ambiguous(n) => style(format!("ambiguous ({})", n)).red(),
    }
}
