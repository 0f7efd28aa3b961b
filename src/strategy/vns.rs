//! Variable neighborhood search over fixed-length move plans.
//!
//! Shares plan representation and evaluation with iterated local search, but
//! diversifies by cycling the shake size `k`: a failed shake grows the
//! neighborhood, an improvement resets it to 1.

use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::budget::{BudgetKind, SearchBudget};
use super::plan::{random_move, Outcome, Plan, PlanEvaluator};
use super::report::{SearchReport, SearchStats, SearchStatus};
use crate::engine::grid::{CellSet, Grid, Move, Position, MOVES};
use crate::engine::hazard::HazardModel;
use crate::engine::rng::SimRng;

/// Variable neighborhood search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VnsParams {
    /// Plan length.
    pub horizon: usize,
    /// Largest shake size.
    pub k_max: usize,
    /// Shake/improve rounds per call.
    pub max_iterations: u64,
    /// Plan evaluations per call.
    pub max_evaluations: u64,
    /// Hill-climbing steps per local search.
    pub local_search_steps: usize,
    /// Wall-clock limit per call.
    pub time_limit: Duration,
    /// Restricted candidate list size for the first plan.
    pub candidate_list: usize,
    /// Weight of the next-tick forecast in greedy move scores.
    pub lookahead_weight: f64,
}

impl Default for VnsParams {
    fn default() -> Self {
        Self {
            horizon: 6,
            k_max: 3,
            max_iterations: 60,
            max_evaluations: 180,
            local_search_steps: 6,
            time_limit: Duration::from_secs(1),
            candidate_list: 3,
            lookahead_weight: 0.35,
        }
    }
}

#[derive(Debug, Clone)]
struct Scored {
    plan: Plan,
    outcome: Outcome,
}

/// Variable neighborhood search move selection.
#[derive(Debug, Clone)]
pub struct VariableNeighborhoodSearch {
    params: VnsParams,
    hazard: HazardModel,
    rng: SimRng,
    stats: SearchStats,
}

impl VariableNeighborhoodSearch {
    /// Create a search with an explicit random seed.
    #[must_use]
    pub fn new(params: VnsParams, hazard: HazardModel, seed: u64) -> Self {
        Self {
            params,
            hazard,
            rng: SimRng::new(seed),
            stats: SearchStats::default(),
        }
    }

    /// Parameters.
    #[must_use]
    pub const fn params(&self) -> &VnsParams {
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
        let outcome = evaluator.evaluate(&plan);
        budget.charge();
        let mut best = self.local_search(&evaluator, &mut budget, Scored { plan, outcome });

        let k_max = self.params.k_max.max(1);
        let mut k = 1;
        let mut iterations = 0;
        let mut stopped = BudgetKind::Iterations;

        while iterations < self.params.max_iterations {
            if let Some(kind) = budget.exhausted() {
                stopped = kind;
                break;
            }
            let shaken = self.shake(&best.plan, k);
            if let Err(kind) = budget.try_consume() {
                stopped = kind;
                break;
            }
            let outcome = evaluator.evaluate(&shaken);
            let candidate = self.local_search(&evaluator, &mut budget, Scored { plan: shaken, outcome });
            iterations += 1;

            if candidate.outcome.beats(&best.outcome) {
                trace!(k, cost = candidate.outcome.cost, "vns improved, neighborhood reset");
                best = candidate;
                k = 1;
            } else {
                k = if k >= k_max { 1 } else { k + 1 };
            }
        }

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
            iterations,
            cost = best.outcome.cost,
            status = %report.status,
            next = %next,
            "variable neighborhood search finished"
        );
        self.stats.record(report);
        next
    }

    /// Randomized greedy construction: each step picks uniformly among the
    /// best-scored few moves.
    fn initial_plan(&mut self, evaluator: &PlanEvaluator<'_>) -> Plan {
        let mut state = evaluator.root().clone();
        let mut plan = Plan::with_capacity(self.params.horizon);
        for _ in 0..self.params.horizon {
            let ranked = evaluator.ranked_moves(&state, self.params.lookahead_weight);
            let shortlist = &ranked[..ranked.len().min(self.params.candidate_list.max(1))];
            let Some(&(_, mv)) = self.rng.choose(shortlist) else {
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

    /// Randomize `k` distinct plan positions.
    fn shake(&mut self, plan: &[Move], k: usize) -> Plan {
        let mut shaken = plan.to_vec();
        for idx in self.rng.sample_indices(shaken.len(), k) {
            shaken[idx] = random_move(&mut self.rng);
        }
        shaken
    }

    /// First-improvement hill climbing scanning positions in shuffled order.
    fn local_search(
        &mut self,
        evaluator: &PlanEvaluator<'_>,
        budget: &mut SearchBudget,
        mut current: Scored,
    ) -> Scored {
        for _ in 0..self.params.local_search_steps {
            let mut indices: Vec<usize> = (0..current.plan.len()).collect();
            self.rng.shuffle(&mut indices);

            let mut improved = false;
            'scan: for idx in indices {
                let base = current.plan[idx];
                for &mv in MOVES.iter().filter(|&&mv| mv != base) {
                    if budget.try_consume().is_err() {
                        return current;
                    }
                    let mut candidate = current.plan.clone();
                    candidate[idx] = mv;
                    let outcome = evaluator.evaluate(&candidate);
                    if outcome.beats(&current.outcome) {
                        current = Scored { plan: candidate, outcome };
                        improved = true;
                        break 'scan;
                    }
                }
            }
            if !improved {
                break;
            }
        }
        current
    }
}
