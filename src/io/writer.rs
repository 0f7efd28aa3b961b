//! Grid and run-report output.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use crate::engine::grid::{CellCounts, Grid};
use crate::error::FireResult;
use crate::strategy::{SearchStatus, Strategy};

/// Render the grid as space-separated tokens, one row per line.
#[must_use]
pub fn render_grid(grid: &Grid) -> String {
    let mut out = String::with_capacity(grid.size() * grid.size() * 2);
    for row in grid.rows() {
        let line: Vec<&str> = row.iter().map(|c| c.token()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// Write the rendered grid to `path`.
///
/// # Errors
///
/// Returns `FireError::Io` if the file cannot be written.
pub fn write_grid(path: impl AsRef<Path>, grid: &Grid) -> FireResult<()> {
    std::fs::write(path, render_grid(grid))?;
    Ok(())
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Tick reached.
    pub tick: u64,
    /// Whether the hazard had stopped expanding.
    pub finished: bool,
    /// Whether no safe cell is reachable from the hazard.
    pub contained: bool,
    /// Final cell counts.
    pub counts: CellCounts,
    /// Strategy name.
    pub strategy: String,
    /// Total nodes or plans evaluated.
    pub evaluated: u64,
    /// Number of decisions made.
    pub searches: u64,
    /// Status of the last decision.
    pub last_status: SearchStatus,
    /// Total time spent deciding, in seconds.
    pub search_seconds: f64,
    /// Wall-clock time of the run, in seconds.
    pub total_seconds: f64,
}

impl RunReport {
    /// Summarise a run.
    #[must_use]
    pub fn from_run(grid: &Grid, strategy: &Strategy, finished: bool, elapsed: Duration) -> Self {
        let stats = strategy.stats();
        Self {
            tick: grid.tick(),
            finished,
            contained: grid.is_contained(),
            counts: grid.counts(),
            strategy: strategy.name().to_string(),
            evaluated: stats.evaluated,
            searches: stats.searches,
            last_status: stats.last_status(),
            search_seconds: stats.search_time.as_secs_f64(),
            total_seconds: elapsed.as_secs_f64(),
        }
    }

    /// Human-readable report.
    #[must_use]
    pub fn to_text(&self) -> String {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        let mut out = String::new();
        let _ = writeln!(out, "Tick               : {}", self.tick);
        let _ = writeln!(
            out,
            "State              : {}",
            if self.finished { "finished" } else { "partial" }
        );
        let _ = writeln!(out, "Strategy           : {}", self.strategy);
        let _ = writeln!(out, "Nodes evaluated    : {}", self.evaluated);
        let _ = writeln!(out, "Decisions          : {}", self.searches);
        let _ = writeln!(out, "Last search status : {}", self.last_status);
        let _ = writeln!(out, "Search time (s)    : {:.6}", self.search_seconds);
        let _ = writeln!(out, "Total time (s)     : {:.6}", self.total_seconds);
        let _ = writeln!(out, "Safe cells         : {}", self.counts.safe + self.counts.agent);
        let _ = writeln!(out, "Burned cells       : {}", self.counts.burning);
        let _ = writeln!(out, "Firebreak cells    : {}", self.counts.firebreak);
        let _ = writeln!(out, "Contained          : {}", yes_no(self.contained));
        out
    }

    /// Pretty JSON report.
    ///
    /// # Errors
    ///
    /// Returns `FireError::Serialization` if encoding fails.
    pub fn to_json(&self) -> FireResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the text report to `path`.
    ///
    /// # Errors
    ///
    /// Returns `FireError::Io` if the file cannot be written.
    pub fn write_report(&self, path: impl AsRef<Path>) -> FireResult<()> {
        std::fs::write(path, self.to_text())?;
        Ok(())
    }
}
