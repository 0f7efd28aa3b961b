//! Move-selection strategies.
//!
//! A closed set of four variants behind one `decide` capability:
//!
//! | Variant | Kind | Randomness |
//! |---------|------|------------|
//! | [`WallHeuristic`] | phase-based policy, no lookahead | none |
//! | [`BranchAndBound`] | best-first tree search with rollout | none |
//! | [`IteratedLocalSearch`] | plan perturbation + hill climbing | seeded |
//! | [`VariableNeighborhoodSearch`] | plan shaking with growing `k` | seeded |
//!
//! Every variant keeps cumulative [`SearchStats`] for reporting.

pub mod branch_and_bound;
pub mod budget;
pub mod frontier;
pub mod ils;
pub mod plan;
pub mod report;
pub mod vns;
pub mod wall;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use branch_and_bound::{BnbParams, BranchAndBound};
pub use budget::{BudgetKind, SearchBudget};
pub use ils::{IlsParams, IteratedLocalSearch};
pub use report::{SearchReport, SearchStats, SearchStatus};
pub use vns::{VariableNeighborhoodSearch, VnsParams};
pub use wall::{WallHeuristic, WallParams};

use crate::engine::grid::{CellSet, Grid, Position};
use crate::error::FireError;

/// Strategy selector, as named in configuration and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Phase-based wall heuristic.
    WallHeuristic,
    /// Branch and bound (default).
    #[default]
    BranchAndBound,
    /// Iterated local search.
    IteratedLocalSearch,
    /// Variable neighborhood search.
    VariableNeighborhoodSearch,
}

impl StrategyKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 4] = [
        Self::WallHeuristic,
        Self::BranchAndBound,
        Self::IteratedLocalSearch,
        Self::VariableNeighborhoodSearch,
    ];

    /// Canonical kebab-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WallHeuristic => "wall-heuristic",
            Self::BranchAndBound => "branch-and-bound",
            Self::IteratedLocalSearch => "iterated-local-search",
            Self::VariableNeighborhoodSearch => "variable-neighborhood-search",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = FireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wall-heuristic" | "wall" | "heuristic" => Ok(Self::WallHeuristic),
            "branch-and-bound" | "bnb" => Ok(Self::BranchAndBound),
            "iterated-local-search" | "ils" => Ok(Self::IteratedLocalSearch),
            "variable-neighborhood-search" | "vns" => Ok(Self::VariableNeighborhoodSearch),
            other => Err(FireError::config(format!(
                "unknown strategy '{other}' (expected one of: wall-heuristic, branch-and-bound, iterated-local-search, variable-neighborhood-search)"
            ))),
        }
    }
}

/// The four move-selection strategies.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Phase-based wall heuristic.
    Wall(WallHeuristic),
    /// Branch and bound.
    BranchAndBound(BranchAndBound),
    /// Iterated local search.
    IteratedLocalSearch(IteratedLocalSearch),
    /// Variable neighborhood search.
    VariableNeighborhoodSearch(VariableNeighborhoodSearch),
}

impl Strategy {
    /// Choose the agent's next position.
    ///
    /// Never fails: illegal choices and exhausted budgets degrade to a legal
    /// move or to `position` itself.
    pub fn decide(&mut self, position: Position, grid: &Grid, forbidden: &CellSet) -> Position {
        match self {
            Self::Wall(s) => s.decide(position, grid, forbidden),
            Self::BranchAndBound(s) => s.decide(position, grid, forbidden),
            Self::IteratedLocalSearch(s) => s.decide(position, grid, forbidden),
            Self::VariableNeighborhoodSearch(s) => s.decide(position, grid, forbidden),
        }
    }

    /// Cumulative search statistics.
    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        match self {
            Self::Wall(s) => s.stats(),
            Self::BranchAndBound(s) => s.stats(),
            Self::IteratedLocalSearch(s) => s.stats(),
            Self::VariableNeighborhoodSearch(s) => s.stats(),
        }
    }

    /// Which variant this is.
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::Wall(_) => StrategyKind::WallHeuristic,
            Self::BranchAndBound(_) => StrategyKind::BranchAndBound,
            Self::IteratedLocalSearch(_) => StrategyKind::IteratedLocalSearch,
            Self::VariableNeighborhoodSearch(_) => StrategyKind::VariableNeighborhoodSearch,
        }
    }

    /// Canonical name of the variant.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grid::Cell;
    use crate::engine::hazard::HazardModel;
    use std::time::Duration;

    fn all_strategies() -> Vec<Strategy> {
        let hazard = HazardModel::default();
        vec![
            Strategy::Wall(WallHeuristic::default()),
            Strategy::BranchAndBound(BranchAndBound::new(
                BnbParams { lookahead: 2, node_limit: 200, time_limit: Duration::from_secs(5) },
                hazard,
            )),
            Strategy::IteratedLocalSearch(IteratedLocalSearch::new(
                IlsParams { max_evaluations: 30, ..IlsParams::default() },
                hazard,
                1,
            )),
            Strategy::VariableNeighborhoodSearch(VariableNeighborhoodSearch::new(
                VnsParams { max_evaluations: 30, ..VnsParams::default() },
                hazard,
                1,
            )),
        ]
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
        }
        assert_eq!("bnb".parse::<StrategyKind>().unwrap(), StrategyKind::BranchAndBound);
        assert_eq!("VNS".parse::<StrategyKind>().unwrap(), StrategyKind::VariableNeighborhoodSearch);
        assert!("genetic".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_kind_serde_kebab_case() {
        let yaml = serde_yaml::to_string(&StrategyKind::IteratedLocalSearch).unwrap();
        assert!(yaml.contains("iterated-local-search"));
    }

    #[test]
    fn test_every_strategy_returns_legal_or_stays() {
        let mut grid = Grid::new(6);
        grid.transition(Position::new(3, 3), Cell::Burning);
        let forbidden = HazardModel::default().pending_ignitions(&grid);
        let position = Position::new(0, 0);
        for mut strategy in all_strategies() {
            let next = strategy.decide(position, &grid, &forbidden);
            assert!(
                next == position || (grid.is_safe(next) && !forbidden.contains(&next)),
                "{} returned illegal {next}",
                strategy.name()
            );
            assert_eq!(strategy.stats().searches, 1);
            assert_ne!(strategy.stats().last_status(), SearchStatus::Idle);
        }
    }

    #[test]
    fn test_no_hazard_is_graceful() {
        let grid = Grid::new(4);
        for mut strategy in all_strategies() {
            let next = strategy.decide(Position::new(1, 1), &grid, &CellSet::new());
            assert!(next.chebyshev(Position::new(1, 1)) <= 1, "{}", strategy.name());
        }
    }

    #[test]
    fn test_kind_matches_variant() {
        let kinds: Vec<StrategyKind> = all_strategies().iter().map(Strategy::kind).collect();
        assert_eq!(kinds, StrategyKind::ALL.to_vec());
    }
}
