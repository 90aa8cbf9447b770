//! Command-line interface

pub mod args;
pub mod commands;
mod context;

pub use args::{Cli, Commands};
pub use context::RunContext;
