//! Terminal output
//!
//! Uses `cliclack` framing and spinners on an interactive terminal and
//! falls back to plain tagged lines (`[OK]`, `[SKIP]`, ...) in CI or when
//! output is piped to a log file.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, section, step_info, step_ok, step_ok_detail, step_skip,
    step_warn_hint, styled_cached, styled_decision,
};
pub use progress::TaskSpinner;
pub use prompts::confirm;
