//! CLI argument parsing.
//!
//! Hand-rolled so that parsing stays testable through [`Args::parse_from`]
//! with any iterator of strings.

use std::path::PathBuf;

use crate::strategy::StrategyKind;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Options of the `run` command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    /// Scenario file.
    pub input: PathBuf,
    /// Optional YAML configuration.
    pub config: Option<PathBuf>,
    /// Strategy override.
    pub strategy: Option<StrategyKind>,
    /// Seed override.
    pub seed: Option<u64>,
    /// Stop once this tick is reached.
    pub until_tick: Option<u64>,
    /// Where to write the final grid.
    pub output: Option<PathBuf>,
    /// Where to write the text report.
    pub report: Option<PathBuf>,
    /// Print the report as JSON instead of text.
    pub json: bool,
    /// Debug-level logging.
    pub verbose: bool,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a scenario.
    Run(RunOptions),
    /// Show help.
    Help,
    /// Show version.
    Version,
    /// Arguments could not be parsed.
    Invalid {
        /// What was wrong.
        message: String,
    },
}

impl Command {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// The first item is the program name.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Whether debug logging was requested.
    #[must_use]
    pub fn verbose(&self) -> bool {
        matches!(&self.command, Command::Run(opts) if opts.verbose)
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(&args[2..]),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => Command::invalid(format!("unknown command: {unknown}")),
        };

        Self { command }
    }

    fn parse_run_command(args: &[String]) -> Command {
        let mut opts = RunOptions::default();
        let mut input = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("{flag} requires a value"))
            };
            let parsed: Result<(), String> = match arg.as_str() {
                "--config" | "-c" => value(arg.as_str()).map(|v| opts.config = Some(PathBuf::from(v))),
                "--strategy" | "-s" => value(arg.as_str()).and_then(|v| {
                    v.parse::<StrategyKind>()
                        .map(|k| opts.strategy = Some(k))
                        .map_err(|e| e.to_string())
                }),
                "--seed" => value(arg.as_str()).and_then(|v| {
                    v.parse()
                        .map(|s| opts.seed = Some(s))
                        .map_err(|_| format!("--seed expects an unsigned integer, got '{v}'"))
                }),
                "--until-tick" => value(arg.as_str()).and_then(|v| {
                    v.parse()
                        .map(|t| opts.until_tick = Some(t))
                        .map_err(|_| format!("--until-tick expects an unsigned integer, got '{v}'"))
                }),
                "--output" | "-o" => value(arg.as_str()).map(|v| opts.output = Some(PathBuf::from(v))),
                "--report" | "-r" => value(arg.as_str()).map(|v| opts.report = Some(PathBuf::from(v))),
                "--json" => {
                    opts.json = true;
                    Ok(())
                }
                "-v" | "--verbose" => {
                    opts.verbose = true;
                    Ok(())
                }
                flag if flag.starts_with('-') => Err(format!("unknown option: {flag}")),
                path if input.is_none() => {
                    input = Some(PathBuf::from(path));
                    Ok(())
                }
                extra => Err(format!("unexpected argument: {extra}")),
            };
            if let Err(message) = parsed {
                return Command::invalid(message);
            }
        }

        match input {
            Some(path) => {
                opts.input = path;
                Command::Run(opts)
            }
            None => Command::invalid("'run' requires an input file"),
        }
    }
}
