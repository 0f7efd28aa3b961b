//! Shared lookahead machinery.
//!
//! Every search strategy simulates the same thing: the agent seals its
//! current cell, steps to a neighbour, seals that too, and the hazard
//! advances one tick. [`SimState`] is that step on a private grid clone;
//! [`PlanEvaluator`] runs whole move sequences and scores them by rollout.

use crate::engine::agent::is_legal_target;
use crate::engine::grid::{Cell, CellCounts, CellSet, Grid, Move, Position, MOVES};
use crate::engine::hazard::HazardModel;
use crate::engine::rng::SimRng;

/// Reward per firebreak cell in tie-break scores.
pub const FIREBREAK_REWARD: f64 = 0.05;

/// Per-step penalty in plan tie-break scores.
pub const PLAN_STEP_PENALTY: f64 = 0.02;

/// A fixed-length move sequence.
pub type Plan = Vec<Move>;

/// Tie-break score: burned cells, minus a small reward per firebreak, plus a
/// small penalty per step taken.
#[must_use]
pub fn tie_break_score(counts: &CellCounts, steps: usize, step_weight: f64) -> f64 {
    counts.burning as f64 - FIREBREAK_REWARD * counts.firebreak as f64 + step_weight * steps as f64
}

/// Simulated grid, agent position and the forecast of the next ignitions.
#[derive(Debug, Clone)]
pub struct SimState {
    /// Private grid clone.
    pub grid: Grid,
    /// Simulated agent position.
    pub position: Position,
    /// Cells forecast to ignite on the next tick.
    pub forecast: CellSet,
}

impl SimState {
    /// Root state for a decision: the agent's cell is already sealed.
    #[must_use]
    pub fn root(grid: &Grid, position: Position, forecast: &CellSet) -> Self {
        let mut grid = grid.clone();
        if grid.get(position) == Some(Cell::AgentMarker) || grid.is_safe(position) {
            grid.transition(position, Cell::Firebreak);
        }
        Self {
            grid,
            position,
            forecast: forecast.clone(),
        }
    }

    /// Target of `mv` if the agent may take it from here.
    ///
    /// The stay move is never a legal target since the agent's own cell is
    /// sealed.
    #[must_use]
    pub fn target(&self, mv: Move) -> Option<Position> {
        self.grid
            .offset(self.position, mv)
            .filter(|&t| is_legal_target(&self.grid, t, &self.forecast))
    }

    /// Legal `(move, target)` pairs in canonical order.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<(Move, Position)> {
        MOVES
            .iter()
            .filter_map(|&mv| self.target(mv).map(|t| (mv, t)))
            .collect()
    }

    /// Plan alphabet from here: stay first, then every legal step.
    #[must_use]
    pub fn plan_moves(&self) -> Vec<Move> {
        std::iter::once(Move::STAY)
            .chain(self.legal_moves().into_iter().map(|(mv, _)| mv))
            .collect()
    }

    /// Occupy `target`, seal it, and advance the hazard one tick.
    pub fn advance_to(&mut self, hazard: &HazardModel, target: Position) {
        self.grid.transition(self.position, Cell::Firebreak);
        self.grid.transition(target, Cell::Firebreak);
        self.position = target;
        self.grid.advance_tick();
        hazard.spread(&mut self.grid);
        self.forecast = hazard.pending_ignitions(&self.grid);
    }

    /// Apply a plan move; an illegal move becomes stay. Returns the move
    /// actually taken.
    pub fn advance_plan_move(&mut self, hazard: &HazardModel, mv: Move) -> Move {
        match self.target(mv) {
            Some(target) => {
                self.advance_to(hazard, target);
                mv
            }
            None => {
                self.advance_to(hazard, self.position);
                Move::STAY
            }
        }
    }

    /// True once the hazard cannot expand any further.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.forecast.is_empty()
    }
}

/// Result of rolling a simulated state out to a fixed point.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Burned cells after the rollout (primary key, minimised).
    pub cost: usize,
    /// Tie-break score (secondary key, minimised).
    pub score: f64,
    /// Ticks simulated before the rollout.
    pub depth: usize,
    /// Cell counts after the rollout.
    pub counts: CellCounts,
    /// Whether the rolled-out grid is contained.
    pub contained: bool,
}

impl Outcome {
    /// Roll `grid` out with no further agent action and score it.
    #[must_use]
    pub fn rollout(hazard: &HazardModel, mut grid: Grid, depth: usize, step_weight: f64) -> Self {
        let limit = HazardModel::rollout_limit(&grid);
        hazard.rollout(&mut grid, limit);
        let counts = grid.counts();
        Self {
            cost: counts.burning,
            score: tie_break_score(&counts, depth, step_weight),
            depth,
            counts,
            contained: grid.is_contained(),
        }
    }

    /// Lexicographic comparison on (cost, score).
    #[must_use]
    pub fn beats(&self, other: &Self) -> bool {
        self.cost < other.cost || (self.cost == other.cost && self.score < other.score)
    }
}

/// Evaluates fixed-length plans from one decision point.
#[derive(Debug, Clone)]
pub struct PlanEvaluator<'a> {
    hazard: &'a HazardModel,
    root: SimState,
}

impl<'a> PlanEvaluator<'a> {
    /// Prepare an evaluator rooted at the live decision state.
    #[must_use]
    pub fn new(hazard: &'a HazardModel, grid: &Grid, position: Position, forbidden: &CellSet) -> Self {
        Self {
            hazard,
            root: SimState::root(grid, position, forbidden),
        }
    }

    /// The root state.
    #[must_use]
    pub const fn root(&self) -> &SimState {
        &self.root
    }

    /// Hazard model used by the simulation.
    #[must_use]
    pub const fn hazard(&self) -> &HazardModel {
        self.hazard
    }

    /// Simulate the plan, stopping early once the hazard settles, then roll
    /// out and score.
    #[must_use]
    pub fn evaluate(&self, plan: &[Move]) -> Outcome {
        let mut state = self.root.clone();
        let mut steps = 0;
        for &mv in plan {
            if state.is_settled() {
                break;
            }
            state.advance_plan_move(self.hazard, mv);
            steps += 1;
        }
        Outcome::rollout(self.hazard, state.grid, steps, PLAN_STEP_PENALTY)
    }

    /// One-step lookahead score: burned cells after the step plus
    /// `lookahead_weight` times the size of the following forecast.
    #[must_use]
    pub fn move_score(&self, state: &SimState, mv: Move, lookahead_weight: f64) -> f64 {
        let mut next = state.clone();
        next.advance_plan_move(self.hazard, mv);
        next.grid.counts().burning as f64 + lookahead_weight * next.forecast.len() as f64
    }

    /// Candidate moves from `state` sorted by ascending move score.
    ///
    /// The sort is stable, so equal scores keep the plan-alphabet order.
    #[must_use]
    pub fn ranked_moves(&self, state: &SimState, lookahead_weight: f64) -> Vec<(f64, Move)> {
        let mut scored: Vec<(f64, Move)> = state
            .plan_moves()
            .into_iter()
            .map(|mv| (self.move_score(state, mv, lookahead_weight), mv))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored
    }

    /// Pad a partial plan with stay moves up to `horizon`.
    #[must_use]
    pub fn pad(mut plan: Plan, horizon: usize) -> Plan {
        plan.resize(horizon.max(plan.len()), Move::STAY);
        plan
    }

    /// Resolve the move to return for the live grid: the plan's first move
    /// if it is legal, otherwise the first legal move, otherwise stay.
    #[must_use]
    pub fn first_target(&self, plan: &[Move]) -> (Position, bool) {
        let chosen = plan.first().and_then(|&mv| self.root.target(mv));
        match chosen {
            Some(target) => (target, false),
            None => (fallback_target(&self.root), true),
        }
    }
}

/// First legal target in canonical order, or the current position.
#[must_use]
pub fn fallback_target(state: &SimState) -> Position {
    state
        .legal_moves()
        .first()
        .map_or(state.position, |&(_, target)| target)
}

/// A uniformly random move from the full 9-move alphabet.
pub fn random_move(rng: &mut SimRng) -> Move {
    MOVES[rng.gen_index(MOVES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burning_center(n: usize) -> Grid {
        let mut grid = Grid::new(n);
        grid.transition(Position::new(n / 2, n / 2), Cell::Burning);
        grid
    }

    #[test]
    fn test_root_seals_agent_cell() {
        let mut grid = Grid::new(3);
        grid.transition(Position::new(0, 0), Cell::AgentMarker);
        let state = SimState::root(&grid, Position::new(0, 0), &CellSet::new());
        assert_eq!(state.grid.cell(Position::new(0, 0)), Cell::Firebreak);
        assert_eq!(grid.cell(Position::new(0, 0)), Cell::AgentMarker);
    }

    #[test]
    fn test_stay_never_legal_at_root() {
        let grid = Grid::new(3);
        let state = SimState::root(&grid, Position::new(1, 1), &CellSet::new());
        assert!(state.target(Move::STAY).is_none());
        assert_eq!(state.legal_moves().len(), 8);
        assert_eq!(state.plan_moves()[0], Move::STAY);
        assert_eq!(state.plan_moves().len(), 9);
    }

    #[test]
    fn test_forecast_excluded() {
        let grid = burning_center(5);
        let hazard = HazardModel::default();
        let forecast = hazard.pending_ignitions(&grid);
        let state = SimState::root(&grid, Position::new(1, 1), &forecast);
        assert!(state.legal_moves().iter().all(|(_, t)| !forecast.contains(t)));
    }

    #[test]
    fn test_advance_seals_and_spreads() {
        let grid = burning_center(5);
        let hazard = HazardModel::default();
        let mut state = SimState::root(&grid, Position::new(0, 0), &CellSet::new());
        state.advance_to(&hazard, Position::new(0, 1));
        assert_eq!(state.position, Position::new(0, 1));
        assert_eq!(state.grid.cell(Position::new(0, 0)), Cell::Firebreak);
        assert_eq!(state.grid.cell(Position::new(0, 1)), Cell::Firebreak);
        assert_eq!(state.grid.counts().burning, 9);
        assert_eq!(state.grid.tick(), 1);
        assert!(!state.is_settled());
    }

    #[test]
    fn test_illegal_plan_move_becomes_stay() {
        let grid = burning_center(5);
        let hazard = HazardModel::default();
        let mut state = SimState::root(&grid, Position::new(0, 0), &CellSet::new());
        let taken = state.advance_plan_move(&hazard, Move::new(-1, 0));
        assert_eq!(taken, Move::STAY);
        assert_eq!(state.position, Position::new(0, 0));
    }

    #[test]
    fn test_evaluate_does_not_touch_live_grid() {
        let grid = burning_center(5);
        let hazard = HazardModel::default();
        let snapshot = grid.clone();
        let evaluator = PlanEvaluator::new(&hazard, &grid, Position::new(0, 0), &CellSet::new());
        let outcome = evaluator.evaluate(&[Move::new(0, 1), Move::new(0, 1)]);
        assert_eq!(grid, snapshot);
        assert!(outcome.cost >= 1);
        assert_eq!(outcome.cost, outcome.counts.burning);
        assert!(outcome.depth <= 2);
    }

    #[test]
    fn test_outcome_beats_lexicographic() {
        let counts = CellCounts::default();
        let a = Outcome { cost: 3, score: 9.0, depth: 0, counts, contained: true };
        let b = Outcome { cost: 4, score: 0.0, depth: 0, counts, contained: true };
        let c = Outcome { cost: 3, score: 8.0, depth: 0, counts, contained: true };
        assert!(a.beats(&b));
        assert!(!b.beats(&a));
        assert!(c.beats(&a));
        assert!(!a.beats(&a));
    }

    #[test]
    fn test_tie_break_score() {
        let counts = CellCounts { safe: 0, burning: 10, firebreak: 4, agent: 0 };
        let score = tie_break_score(&counts, 5, PLAN_STEP_PENALTY);
        assert!((score - (10.0 - 0.2 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_pad() {
        let plan = PlanEvaluator::pad(vec![Move::new(1, 0)], 3);
        assert_eq!(plan, vec![Move::new(1, 0), Move::STAY, Move::STAY]);
    }

    #[test]
    fn test_first_target_fallback() {
        let grid = Grid::new(3);
        let hazard = HazardModel::default();
        let evaluator = PlanEvaluator::new(&hazard, &grid, Position::new(0, 0), &CellSet::new());
        let (target, fallback) = evaluator.first_target(&[Move::new(-1, -1)]);
        assert!(fallback);
        assert_eq!(target, Position::new(0, 1));
        let (target, fallback) = evaluator.first_target(&[Move::new(1, 1)]);
        assert!(!fallback);
        assert_eq!(target, Position::new(1, 1));
    }

    #[test]
    fn test_ranked_moves_sorted() {
        let grid = burning_center(5);
        let hazard = HazardModel::default();
        let evaluator = PlanEvaluator::new(&hazard, &grid, Position::new(1, 1), &CellSet::new());
        let ranked = evaluator.ranked_moves(evaluator.root(), 0.3);
        assert!(!ranked.is_empty());
        assert!(ranked.windows(2).all(|w| w[0].0 <= w[1].0));
    }
}
