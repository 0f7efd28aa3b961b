//! Best-first branch and bound over future grid states.
//!
//! Each node is a simulated state after a sequence of agent steps. The
//! frontier pops the node with the lowest bound (burned cells so far, which
//! never decreases), so pruning against the incumbent is sound. Leaves are
//! scored by a pessimistic rollout where the agent does nothing more.
//!
//! The controller is receding-horizon: only the first step of the winning
//! path is returned and the search restarts from scratch next tick.

use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::budget::{BudgetKind, SearchBudget};
use super::frontier::SearchFrontier;
use super::plan::{fallback_target, Outcome, SimState, FIREBREAK_REWARD};
use super::report::{SearchReport, SearchStats, SearchStatus};
use crate::engine::grid::{CellSet, Grid, Position};
use crate::engine::hazard::HazardModel;

/// Per-depth penalty in the tie-break score.
pub const DEPTH_PENALTY: f64 = 0.05;

/// Branch-and-bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BnbParams {
    /// Maximum search depth before rollout.
    pub lookahead: usize,
    /// Maximum child nodes generated per call.
    pub node_limit: u64,
    /// Wall-clock limit per call.
    pub time_limit: Duration,
}

impl Default for BnbParams {
    fn default() -> Self {
        Self {
            lookahead: 5,
            node_limit: 2_000,
            time_limit: Duration::from_secs(5),
        }
    }
}

/// A state in the search tree.
#[derive(Debug, Clone)]
struct SearchNode {
    state: SimState,
    /// Agent positions after each simulated step.
    path: Vec<Position>,
    depth: usize,
    /// Burned cells; also the node's bound.
    cost: usize,
    /// Tie-break score (not used for pruning).
    score: f64,
}

impl SearchNode {
    fn root(state: SimState) -> Self {
        let counts = state.grid.counts();
        Self {
            cost: counts.burning,
            score: counts.burning as f64 - FIREBREAK_REWARD * counts.firebreak as f64,
            state,
            path: Vec::new(),
            depth: 0,
        }
    }

    fn child(&self, hazard: &HazardModel, target: Position) -> Self {
        let mut state = self.state.clone();
        state.advance_to(hazard, target);
        let counts = state.grid.counts();
        let depth = self.depth + 1;
        let mut path = self.path.clone();
        path.push(target);
        Self {
            cost: counts.burning,
            score: counts.burning as f64 - FIREBREAK_REWARD * counts.firebreak as f64
                + DEPTH_PENALTY * depth as f64,
            state,
            path,
            depth,
        }
    }

    /// Admissible lower bound on any descendant's rollout cost.
    const fn bound(&self) -> usize {
        self.cost
    }
}

/// Branch-and-bound move selection.
#[derive(Debug, Clone)]
pub struct BranchAndBound {
    params: BnbParams,
    hazard: HazardModel,
    stats: SearchStats,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self::new(BnbParams::default(), HazardModel::default())
    }
}

impl BranchAndBound {
    /// Create a search with the given parameters and hazard model.
    #[must_use]
    pub fn new(params: BnbParams, hazard: HazardModel) -> Self {
        Self {
            params,
            hazard,
            stats: SearchStats::default(),
        }
    }

    /// Parameters.
    #[must_use]
    pub const fn params(&self) -> &BnbParams {
        &self.params
    }

    /// Cumulative statistics.
    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Pick the next position.
    pub fn decide(&mut self, position: Position, grid: &Grid, forbidden: &CellSet) -> Position {
        let start = Instant::now();
        let mut budget =
            SearchBudget::start(self.params.node_limit, BudgetKind::Nodes, self.params.time_limit);

        let root = SearchNode::root(SimState::root(grid, position, forbidden));
        let fallback = fallback_target(&root.state);

        let mut frontier = SearchFrontier::new();
        frontier.push(root.bound(), root);

        let mut incumbent: Option<(Outcome, Option<Position>)> = None;
        let mut stopped: Option<BudgetKind> = None;

        'search: while let Some(entry) = frontier.pop() {
            if budget.time_exhausted() {
                stopped = Some(BudgetKind::Time);
                break;
            }
            let node = entry.node;
            if incumbent.as_ref().is_some_and(|(best, _)| node.bound() >= best.cost) {
                trace!(bound = node.bound(), depth = node.depth, "pruned");
                continue;
            }

            let moves = node.state.legal_moves();
            if node.depth >= self.params.lookahead || moves.is_empty() {
                // The unexpanded root never becomes the incumbent while moves remain.
                if node.depth == 0 && !moves.is_empty() {
                    continue;
                }
                let outcome =
                    Outcome::rollout(&self.hazard, node.state.grid, node.depth, DEPTH_PENALTY);
                if incumbent.as_ref().map_or(true, |(best, _)| outcome.beats(best)) {
                    trace!(cost = outcome.cost, depth = outcome.depth, "new incumbent");
                    incumbent = Some((outcome, node.path.first().copied()));
                }
                continue;
            }

            for (_, target) in moves {
                if let Err(kind) = budget.try_consume() {
                    stopped = Some(kind);
                    break 'search;
                }
                let child = node.child(&self.hazard, target);
                if incumbent.as_ref().is_some_and(|(best, _)| child.bound() >= best.cost) {
                    continue;
                }
                frontier.push(child.bound(), child);
            }
        }

        let (next, status, outcome) = match incumbent {
            Some((outcome, first)) => {
                let status = stopped.map_or(SearchStatus::SolutionFound, SearchStatus::BudgetExhausted);
                (first.unwrap_or(position), status, Some(outcome))
            }
            None => {
                debug!(?stopped, fallback = %fallback, "branch and bound found no incumbent");
                (fallback, SearchStatus::Fallback, None)
            }
        };

        let report = SearchReport {
            evaluated: budget.used(),
            status,
            elapsed: start.elapsed(),
            depth: outcome.as_ref().map_or(0, |o| o.depth),
            counts: outcome.as_ref().map(|o| o.counts),
            contained: outcome.as_ref().map(|o| o.contained),
        };
        debug!(
            nodes = report.evaluated,
            status = %report.status,
            elapsed_ms = report.elapsed.as_millis() as u64,
            next = %next,
            "branch and bound search finished"
        );
        self.stats.record(report);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grid::Cell;

    fn fire_at(n: usize, row: usize, col: usize) -> Grid {
        let mut grid = Grid::new(n);
        grid.transition(Position::new(row, col), Cell::Burning);
        grid
    }

    #[test]
    fn test_returns_adjacent_legal_move() {
        let grid = fire_at(6, 3, 3);
        let hazard = HazardModel::default();
        let forbidden = hazard.pending_ignitions(&grid);
        let mut bnb = BranchAndBound::new(
            BnbParams { lookahead: 2, node_limit: 500, time_limit: Duration::from_secs(5) },
            hazard,
        );
        let position = Position::new(0, 0);
        let next = bnb.decide(position, &grid, &forbidden);
        assert_eq!(position.chebyshev(next), 1);
        assert!(grid.is_safe(next));
        assert!(!forbidden.contains(&next));
        assert_eq!(bnb.stats().searches, 1);
        assert!(bnb.stats().evaluated > 0);
    }

    #[test]
    fn test_node_limit_zero_falls_back_to_legal_move() {
        let grid = fire_at(5, 2, 2);
        let hazard = HazardModel::default();
        let forbidden = hazard.pending_ignitions(&grid);
        let mut bnb = BranchAndBound::new(
            BnbParams { lookahead: 5, node_limit: 0, time_limit: Duration::from_secs(5) },
            hazard,
        );
        let position = Position::new(0, 0);
        let next = bnb.decide(position, &grid, &forbidden);
        assert_ne!(next, position);
        assert!(grid.is_safe(next));
        assert!(!forbidden.contains(&next));
        assert_eq!(next, Position::new(0, 1));
        assert_eq!(bnb.stats().last_status(), SearchStatus::Fallback);
        assert_eq!(bnb.stats().evaluated, 0);
    }

    #[test]
    fn test_no_legal_moves_stays() {
        let mut grid = fire_at(3, 2, 2);
        for pos in [Position::new(0, 1), Position::new(1, 0), Position::new(1, 1)] {
            grid.transition(pos, Cell::Firebreak);
        }
        let mut bnb = BranchAndBound::default();
        let next = bnb.decide(Position::new(0, 0), &grid, &CellSet::new());
        assert_eq!(next, Position::new(0, 0));
        assert_eq!(bnb.stats().last_status(), SearchStatus::SolutionFound);
    }

    #[test]
    fn test_node_budget_respected() {
        let grid = fire_at(7, 3, 3);
        let hazard = HazardModel::default();
        let forbidden = hazard.pending_ignitions(&grid);
        let mut bnb = BranchAndBound::new(
            BnbParams { lookahead: 6, node_limit: 25, time_limit: Duration::from_secs(5) },
            hazard,
        );
        bnb.decide(Position::new(0, 0), &grid, &forbidden);
        let last = bnb.stats().last.clone().unwrap();
        assert!(last.evaluated <= 25);
    }

    #[test]
    fn test_zero_time_limit_falls_back() {
        let grid = fire_at(5, 2, 2);
        let mut bnb = BranchAndBound::new(
            BnbParams { lookahead: 3, node_limit: 100, time_limit: Duration::ZERO },
            HazardModel::default(),
        );
        let next = bnb.decide(Position::new(0, 0), &grid, &CellSet::new());
        assert_eq!(bnb.stats().last_status(), SearchStatus::Fallback);
        assert!(grid.is_safe(next));
    }

    #[test]
    fn test_search_does_not_mutate_live_grid() {
        let grid = fire_at(5, 2, 2);
        let snapshot = grid.clone();
        let mut bnb = BranchAndBound::new(
            BnbParams { lookahead: 2, node_limit: 200, time_limit: Duration::from_secs(5) },
            HazardModel::default(),
        );
        bnb.decide(Position::new(4, 4), &grid, &CellSet::new());
        assert_eq!(grid, snapshot);
    }

    #[test]
    fn test_solution_reports_rollout() {
        let grid = fire_at(4, 0, 0);
        let hazard = HazardModel::default();
        let forbidden = hazard.pending_ignitions(&grid);
        let mut bnb = BranchAndBound::new(
            BnbParams { lookahead: 1, node_limit: 100, time_limit: Duration::from_secs(5) },
            hazard,
        );
        bnb.decide(Position::new(3, 3), &grid, &forbidden);
        let last = bnb.stats().last.clone().unwrap();
        assert_eq!(last.status, SearchStatus::SolutionFound);
        assert_eq!(last.depth, 1);
        assert!(last.counts.is_some());
        assert_eq!(last.contained, Some(true));
    }

    #[test]
    fn test_children_respect_node_forecast() {
        let grid = fire_at(5, 2, 2);
        let hazard = HazardModel::default();
        let root = SearchNode::root(SimState::root(&grid, Position::new(0, 0), &CellSet::new()));
        for (_, target) in root.state.legal_moves() {
            let child = root.child(&hazard, target);
            for (_, next) in child.state.legal_moves() {
                assert!(!child.state.forecast.contains(&next));
            }
        }
    }
}
