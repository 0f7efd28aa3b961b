//! firebreak CLI
//!
//! Command-line interface for running fire-containment scenarios.
//! All logic lives in the `cli` module so it can be tested.

use firebreak::cli::{run_cli, Args};
use firebreak::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(logging::default_level(args.verbose()));
    run_cli(args)
}
