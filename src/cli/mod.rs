//! CLI module for firebreak.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! The entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, RunOptions};
pub use commands::{resolve_config, run_cli, run_command, run_scenario, RunOutcome};
pub use output::{format_run_summary, print_help, print_version, version_string};
