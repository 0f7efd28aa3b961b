//! Search statistics.
//!
//! Reporting only: nothing here feeds back into move selection.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::budget::BudgetKind;
use crate::engine::grid::CellCounts;

/// Outcome of the most recent `decide` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStatus {
    /// No search has run yet.
    #[default]
    Idle,
    /// The search finished on its own with an incumbent.
    SolutionFound,
    /// A budget stopped the search; the incumbent was used.
    BudgetExhausted(BudgetKind),
    /// No incumbent; a fallback move was returned.
    Fallback,
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::SolutionFound => f.write_str("solution found"),
            Self::BudgetExhausted(kind) => write!(f, "budget exhausted ({kind})"),
            Self::Fallback => f.write_str("fallback"),
        }
    }
}

/// Per-call search report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Nodes generated or plans evaluated.
    pub evaluated: u64,
    /// Terminal status.
    pub status: SearchStatus,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Depth (ticks simulated) of the winning node or plan.
    pub depth: usize,
    /// Cell counts after the winning rollout, when one exists.
    pub counts: Option<CellCounts>,
    /// Whether the winning rollout ended contained.
    pub contained: Option<bool>,
}

/// Cumulative statistics across every `decide` call of one strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Total nodes or plans evaluated.
    pub evaluated: u64,
    /// Total time spent deciding.
    pub search_time: Duration,
    /// Number of `decide` calls.
    pub searches: u64,
    /// Report of the last call.
    pub last: Option<SearchReport>,
}

impl SearchStats {
    /// Fold one call's report into the totals.
    pub fn record(&mut self, report: SearchReport) {
        self.evaluated += report.evaluated;
        self.search_time += report.elapsed;
        self.searches += 1;
        self.last = Some(report);
    }

    /// Status of the last call (`Idle` before any call).
    #[must_use]
    pub fn last_status(&self) -> SearchStatus {
        self.last.as_ref().map_or(SearchStatus::Idle, |r| r.status)
    }
}
