//! CLI command handlers.
//!
//! [`run_scenario`] does the work and returns a value; [`run_cli`] only
//! turns results into console output and an exit code.

use std::process::ExitCode;
use tracing::info;

use crate::config::{FireConfig, StopRule};
use crate::engine::{Agent, Grid, SimulationDriver};
use crate::error::FireResult;
use crate::io::{load_input, write_grid, RunReport};

use super::args::RunOptions;
use super::output::{format_run_summary, print_help, print_version};
use super::{Args, Command};

/// Result of a completed `run`.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final grid.
    pub grid: Grid,
    /// Ticks executed.
    pub steps: usize,
    /// Run summary.
    pub report: RunReport,
}

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run(opts) => run_command(&opts),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
        Command::Invalid { message } => {
            eprintln!("Error: {message}\n");
            print_help();
            ExitCode::from(1)
        }
    }
}

/// Execute `run` and print its summary.
#[must_use]
pub fn run_command(opts: &RunOptions) -> ExitCode {
    match run_scenario(opts).and_then(|outcome| {
        let summary = format_run_summary(&outcome, opts)?;
        print!("{summary}");
        Ok(())
    }) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_input_error() => {
            eprintln!("Invalid input file {}: {e}", opts.input.display());
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Resolve the configuration for a run: file (or defaults) plus CLI
/// overrides.
///
/// # Errors
///
/// Returns configuration and I/O errors from loading the YAML file.
pub fn resolve_config(opts: &RunOptions) -> FireResult<FireConfig> {
    let mut config = match &opts.config {
        Some(path) => FireConfig::load(path)?,
        None => FireConfig::default(),
    };
    if let Some(seed) = opts.seed {
        config.reproducibility.seed = seed;
    }
    if let Some(kind) = opts.strategy {
        config.strategy.kind = kind;
    }
    Ok(config)
}

/// Load the scenario, run it, and write any requested files.
///
/// # Errors
///
/// Returns input-format, configuration, I/O and invariant errors.
pub fn run_scenario(opts: &RunOptions) -> FireResult<RunOutcome> {
    let config = resolve_config(opts)?;
    let scenario = load_input(&opts.input)?;

    info!(
        input = %opts.input.display(),
        size = scenario.size(),
        strategy = %config.strategy.kind,
        seed = config.reproducibility.seed,
        "starting run"
    );

    let agent = Agent::new(scenario.agent, config.build_strategy());
    let mut driver = SimulationDriver::new(scenario.grid, agent, config.hazard_model())
        .with_invariant_checks(config.driver.check_invariants);

    let max_steps = config.driver.max_steps;
    let steps = match (opts.until_tick, config.driver.stop_rule) {
        (Some(target), _) => driver.run_to_tick(target, max_steps)?,
        (None, StopRule::FixedPoint) => driver.run_to_fixed_point(max_steps)?,
        (None, StopRule::Stable) => driver.run_until_stable(max_steps)?,
    };

    let report = driver.report();
    if let Some(path) = &opts.output {
        write_grid(path, driver.grid())?;
    }
    if let Some(path) = &opts.report {
        report.write_report(path)?;
    }

    Ok(RunOutcome {
        grid: driver.grid().clone(),
        steps,
        report,
    })
}
