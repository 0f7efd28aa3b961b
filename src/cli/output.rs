//! CLI output formatting.

use std::fmt::Write as _;

use crate::error::FireResult;
use crate::io::render_grid;

use super::args::RunOptions;
use super::commands::RunOutcome;

/// Print version information.
pub fn print_version() {
    println!("{}", version_string());
}

/// Version line, with the build's git hash when one was captured.
#[must_use]
pub fn version_string() -> String {
    let version = env!("FIREBREAK_VERSION");
    match option_env!("FIREBREAK_GIT_HASH") {
        Some(hash) if !hash.is_empty() => {
            format!("firebreak {version} ({})", hash.get(..12).unwrap_or(hash))
        }
        _ => format!("firebreak {version}"),
    }
}

/// Print help message.
pub fn print_help() {
    println!(
        r"firebreak - fire containment on a square grid

USAGE:
    firebreak <COMMAND> [OPTIONS]

COMMANDS:
    run <input.dat>             Run a scenario until the fire stops
        -c, --config <file>     YAML configuration
        -s, --strategy <name>   wall-heuristic | branch-and-bound |
                                iterated-local-search | variable-neighborhood-search
                                (aliases: wall, bnb, ils, vns)
        --seed <N>              Seed for the stochastic strategies
        --until-tick <K>        Stop once tick K is reached
        -o, --output <file>     Write the final grid
        -r, --report <file>     Write the text report
        --json                  Print the report as JSON
        -v, --verbose           Debug logging (RUST_LOG overrides)

    help                        Show this help message
    version                     Show version information

INPUT FORMAT:
    n                           grid size
    row col                     initial fire
    row col                     firefighter
    n rows of n symbols         * safe, - burning, + firebreak, x agent trail

EXAMPLES:
    firebreak run input.dat
    firebreak run input.dat --strategy ils --seed 7 --output final.dat
    firebreak run input.dat --config run.yaml --json
"
    );
}

/// Console summary of a run.
///
/// The grid is included unless it was written to a file.
///
/// # Errors
///
/// Returns `FireError::Serialization` if JSON encoding fails.
pub fn format_run_summary(outcome: &RunOutcome, opts: &RunOptions) -> FireResult<String> {
    let mut out = String::new();
    if opts.output.is_none() && !opts.json {
        out.push_str(&render_grid(&outcome.grid));
        out.push('\n');
    }
    if opts.json {
        out.push_str(&outcome.report.to_json()?);
        out.push('\n');
    } else {
        let _ = writeln!(out, "Steps run          : {}", outcome.steps);
        out.push_str(&outcome.report.to_text());
    }
    Ok(out)
}
