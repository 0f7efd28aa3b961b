//! Scenario loader.
//!
//! Text format (blank lines ignored):
//!
//! ```text
//! 5          ← grid size n
//! 2 2        ← hazard row col
//! 0 0        ← agent row col
//! * * * * *  ← n rows of n tokens
//! ...
//! ```
//!
//! Every failure is reported as [`FireError::InputFormat`] before a grid
//! ever reaches the engine.

use std::path::Path;
use tracing::debug;

use crate::engine::grid::{Cell, Grid, Position};
use crate::error::{FireError, FireResult};

/// A validated starting configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Initial hazard cell (set `Burning`).
    pub hazard: Position,
    /// Initial agent cell (set `AgentMarker`).
    pub agent: Position,
    /// The grid, with hazard and agent already placed.
    pub grid: Grid,
}

impl Scenario {
    /// Grid side length.
    #[must_use]
    pub fn size(&self) -> usize {
        self.grid.size()
    }
}

/// Read and parse a scenario file.
///
/// # Errors
///
/// Returns `FireError::Io` if the file cannot be read and
/// `FireError::InputFormat` if its contents are malformed.
pub fn load_input(path: impl AsRef<Path>) -> FireResult<Scenario> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = text.len(), "loading scenario");
    parse_input(&text)
}

/// Parse scenario text.
///
/// # Errors
///
/// Returns `FireError::InputFormat` describing the first problem found.
pub fn parse_input(text: &str) -> FireResult<Scenario> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    match lines.len() {
        0 => return Err(FireError::input("missing the grid size line")),
        1 => return Err(FireError::input("missing the hazard coordinates line")),
        2 => return Err(FireError::input("missing the agent coordinates line")),
        _ => {}
    }

    let n = parse_size(lines[0])?;
    let available = lines.len() - 3;
    if available < n {
        return Err(FireError::input(format!(
            "grid is incomplete: expected {n} rows, found {available}"
        )));
    }
    if available > n {
        debug!(extra = available - n, "ignoring trailing lines after the grid");
    }

    let hazard = parse_pair(lines[1], "hazard")?;
    let agent = parse_pair(lines[2], "agent")?;

    let mut grid = parse_grid(&lines[3..3 + n], n)?;

    let hazard = validate_inside(hazard, n, "hazard")?;
    let agent = validate_inside(agent, n, "agent")?;

    grid.place(hazard, Cell::Burning);
    grid.place(agent, Cell::AgentMarker);

    Ok(Scenario {
        hazard,
        agent,
        grid,
    })
}

fn parse_size(text: &str) -> FireResult<usize> {
    let n: i64 = text
        .parse()
        .map_err(|_| FireError::input(format!("grid size must be an integer: '{text}'")))?;
    if n <= 0 {
        return Err(FireError::input(format!("grid size must be positive, got {n}")));
    }
    usize::try_from(n).map_err(|_| FireError::input(format!("grid size too large: {n}")))
}

fn parse_pair(text: &str, label: &str) -> FireResult<(i64, i64)> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let [row, col] = parts.as_slice() else {
        return Err(FireError::input(format!(
            "the {label} line must contain exactly two integers: '{text}'"
        )));
    };
    let parse = |s: &str| {
        s.parse::<i64>().map_err(|_| {
            FireError::input(format!("{label} coordinates must be integers: '{text}'"))
        })
    };
    Ok((parse(row)?, parse(col)?))
}

fn validate_inside((row, col): (i64, i64), n: usize, label: &str) -> FireResult<Position> {
    let inside = |v: i64| usize::try_from(v).ok().filter(|&v| v < n);
    match (inside(row), inside(col)) {
        (Some(r), Some(c)) => Ok(Position::new(r, c)),
        _ => Err(FireError::input(format!(
            "{label} position ({row},{col}) is outside the {n}x{n} grid"
        ))),
    }
}

fn parse_grid(lines: &[&str], n: usize) -> FireResult<Grid> {
    let mut rows = Vec::with_capacity(n);
    for (row_idx, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != n {
            return Err(FireError::input(format!(
                "row {} has {} columns, expected {n}",
                row_idx + 1,
                tokens.len()
            )));
        }
        let row = tokens
            .iter()
            .enumerate()
            .map(|(col_idx, token)| {
                Cell::from_token(token).ok_or_else(|| {
                    FireError::input(format!(
                        "unknown symbol '{token}' at row {}, column {}",
                        row_idx + 1,
                        col_idx + 1
                    ))
                })
            })
            .collect::<FireResult<Vec<Cell>>>()?;
        rows.push(row);
    }
    Grid::from_rows(rows)
}
