//! Cooperative search budgets.
//!
//! Searches poll a [`SearchBudget`] before every unit of work (node
//! generation or plan evaluation). There is no external cancellation; the
//! budget is the only thing that stops a search early.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Which limit stopped a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetKind {
    /// Node-generation limit (branch and bound).
    Nodes,
    /// Plan-evaluation limit (ILS, VNS).
    Evaluations,
    /// Outer iteration limit (VNS).
    Iterations,
    /// Wall-clock limit.
    Time,
}

impl std::fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Nodes => "node limit",
            Self::Evaluations => "evaluation limit",
            Self::Iterations => "iteration limit",
            Self::Time => "time limit",
        };
        f.write_str(label)
    }
}

/// Counter plus wall-clock budget for a single `decide` call.
#[derive(Debug, Clone)]
pub struct SearchBudget {
    start: Instant,
    time_limit: Duration,
    limit: u64,
    used: u64,
    kind: BudgetKind,
}

impl SearchBudget {
    /// Start a budget now.
    ///
    /// `kind` names the counter (`Nodes` or `Evaluations`) so exhaustion can
    /// be reported precisely.
    #[must_use]
    pub fn start(limit: u64, kind: BudgetKind, time_limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            time_limit,
            limit,
            used: 0,
            kind,
        }
    }

    /// Which limit is exhausted, if any. The counter is checked first.
    #[must_use]
    pub fn exhausted(&self) -> Option<BudgetKind> {
        if self.used >= self.limit {
            Some(self.kind)
        } else if self.time_exhausted() {
            Some(BudgetKind::Time)
        } else {
            None
        }
    }

    /// True once the wall-clock limit has elapsed.
    #[must_use]
    pub fn time_exhausted(&self) -> bool {
        self.start.elapsed() >= self.time_limit
    }

    /// Claim one unit of work.
    ///
    /// # Errors
    ///
    /// Returns the exhausted limit without consuming anything.
    pub fn try_consume(&mut self) -> Result<(), BudgetKind> {
        match self.exhausted() {
            Some(kind) => Err(kind),
            None => {
                self.used += 1;
                Ok(())
            }
        }
    }

    /// Record work done outside `try_consume` (e.g. a mandatory evaluation).
    pub fn charge(&mut self) {
        self.used += 1;
    }

    /// Units consumed so far.
    #[must_use]
    pub const fn used(&self) -> u64 {
        self.used
    }

    /// Configured counter limit.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Time since the budget started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
