//! Iterated local search over fixed-length move plans.
//!
//! A biased random walk builds the first plan. Each iteration perturbs the
//! current plan, improves it with bounded first-improvement hill climbing,
//! and accepts it if it beats the current plan (or occasionally anyway). The
//! best plan seen is tracked separately and its first move is returned.

use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::budget::{BudgetKind, SearchBudget};
use super::plan::{random_move, Outcome, Plan, PlanEvaluator};
use super::report::{SearchReport, SearchStats, SearchStatus};
use crate::engine::grid::{CellSet, Grid, Move, Position, MOVES};
use crate::engine::hazard::HazardModel;
use crate::engine::rng::SimRng;

/// Iterated local search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IlsParams {
    /// Plan length.
    pub horizon: usize,
    /// Plan evaluations per call.
    pub max_evaluations: u64,
    /// Hill-climbing steps per local search.
    pub local_search_steps: usize,
    /// Plan positions mutated per perturbation.
    pub perturbation_strength: usize,
    /// Wall-clock limit per call.
    pub time_limit: Duration,
    /// Probability of a greedy pick while building the first plan.
    pub greedy_bias: f64,
    /// Probability of accepting a non-improving plan.
    pub acceptance_probability: f64,
    /// Weight of the next-tick forecast in greedy move scores.
    pub lookahead_weight: f64,
}

impl Default for IlsParams {
    fn default() -> Self {
        Self {
            horizon: 6,
            max_evaluations: 120,
            local_search_steps: 15,
            perturbation_strength: 2,
            time_limit: Duration::from_secs(1),
            greedy_bias: 0.45,
            acceptance_probability: 0.10,
            lookahead_weight: 0.30,
        }
    }
}

/// A plan with its evaluated outcome.
#[derive(Debug, Clone)]
struct Scored {
    plan: Plan,
    outcome: Outcome,
}

/// Iterated local search move selection.
#[derive(Debug, Clone)]
pub struct IteratedLocalSearch {
    params: IlsParams,
    hazard: HazardModel,
    rng: SimRng,
    stats: SearchStats,
}

impl IteratedLocalSearch {
    /// Create a search with an explicit random seed.
    #[must_use]
    pub fn new(params: IlsParams, hazard: HazardModel, seed: u64) -> Self {
        Self {
            params,
            hazard,
            rng: SimRng::new(seed),
            stats: SearchStats::default(),
        }
    }

    /// Parameters.
    #[must_use]
    pub const fn params(&self) -> &IlsParams {
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
        let hazard = self.hazard;
        let evaluator = PlanEvaluator::new(&hazard, grid, position, forbidden);
        let mut budget = SearchBudget::start(
            self.params.max_evaluations,
            BudgetKind::Evaluations,
            self.params.time_limit,
        );

        let plan = self.initial_plan(&evaluator);
        // The first plan is always evaluated so there is an incumbent.
        let outcome = evaluator.evaluate(&plan);
        budget.charge();
        let mut current = Scored { plan, outcome };
        let mut best = current.clone();

        let stopped = loop {
            if let Some(kind) = budget.exhausted() {
                break kind;
            }
            let perturbed = self.perturb(&current.plan);
            let Some(candidate) = self.local_search(&evaluator, &mut budget, perturbed) else {
                continue;
            };

            if candidate.outcome.beats(&current.outcome) {
                if candidate.outcome.beats(&best.outcome) {
                    trace!(cost = candidate.outcome.cost, "ils improved best plan");
                    best = candidate.clone();
                }
                current = candidate;
            } else if self.rng.gen_bool(self.params.acceptance_probability) {
                current = candidate;
            }
        };

        let (next, fallback) = evaluator.first_target(&best.plan);
        if fallback {
            trace!(next = %next, "best plan opens with an illegal move, using first legal move");
        }
        let status = SearchStatus::BudgetExhausted(stopped);
        let report = SearchReport {
            evaluated: budget.used(),
            status,
            elapsed: start.elapsed(),
            depth: best.outcome.depth,
            counts: Some(best.outcome.counts),
            contained: Some(best.outcome.contained),
        };
        debug!(
            plans = report.evaluated,
            cost = best.outcome.cost,
            status = %report.status,
            next = %next,
            "iterated local search finished"
        );
        self.stats.record(report);
        next
    }

    /// Biased random walk: greedy with probability `greedy_bias`, otherwise a
    /// uniformly random plan move. Padded with stay once the hazard settles.
    fn initial_plan(&mut self, evaluator: &PlanEvaluator<'_>) -> Plan {
        let mut state = evaluator.root().clone();
        let mut plan = Plan::with_capacity(self.params.horizon);
        for _ in 0..self.params.horizon {
            let moves = state.plan_moves();
            let chosen = if self.rng.gen_bool(self.params.greedy_bias) {
                evaluator
                    .ranked_moves(&state, self.params.lookahead_weight)
                    .first()
                    .map(|&(_, mv)| mv)
            } else {
                self.rng.choose(&moves).copied()
            };
            let Some(mv) = chosen else {
                break;
            };
            plan.push(mv);
            state.advance_plan_move(evaluator.hazard(), mv);
            if state.is_settled() {
                break;
            }
        }
        PlanEvaluator::pad(plan, self.params.horizon)
    }

    fn perturb(&mut self, plan: &[Move]) -> Plan {
        let mut mutated = plan.to_vec();
        if mutated.is_empty() {
            return mutated;
        }
        for _ in 0..self.params.perturbation_strength {
            let idx = self.rng.gen_index(mutated.len());
            mutated[idx] = random_move(&mut self.rng);
        }
        mutated
    }

    /// First-improvement hill climbing on single-position mutations.
    ///
    /// Returns `None` if the budget did not allow evaluating the start plan.
    fn local_search(
        &mut self,
        evaluator: &PlanEvaluator<'_>,
        budget: &mut SearchBudget,
        plan: Plan,
    ) -> Option<Scored> {
        budget.try_consume().ok()?;
        let outcome = evaluator.evaluate(&plan);
        let mut current = Scored { plan, outcome };
        if current.plan.is_empty() {
            return Some(current);
        }

        for _ in 0..self.params.local_search_steps {
            let idx = self.rng.gen_index(current.plan.len());
            let base = current.plan[idx];
            let mut improved = false;
            for &mv in MOVES.iter().filter(|&&mv| mv != base) {
                if budget.try_consume().is_err() {
                    return Some(current);
                }
                let mut candidate = current.plan.clone();
                candidate[idx] = mv;
                let outcome = evaluator.evaluate(&candidate);
                if outcome.beats(&current.outcome) {
                    current = Scored { plan: candidate, outcome };
                    improved = true;
                    break;
                }
            }
            if !improved {
                break;
            }
        }
        Some(current)
    }
}
