//! Hazard spread model.
//!
//! One tick of growth is computed as a pure query over frontier sets and then
//! applied in a single pass, so simultaneous ignitions never depend on the
//! order cells are visited.

use serde::{Deserialize, Serialize};

use super::grid::{Cell, CellSet, Grid};

/// Default wavefront advance per tick.
pub const DEFAULT_GROWTH_RATE: usize = 1;

/// Cellular-automaton fire model with a configurable growth rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardModel {
    growth_rate: usize,
}

impl Default for HazardModel {
    fn default() -> Self {
        Self::new(DEFAULT_GROWTH_RATE)
    }
}

impl HazardModel {
    /// Create a model advancing `growth_rate` cells per tick (minimum 1).
    #[must_use]
    pub fn new(growth_rate: usize) -> Self {
        Self {
            growth_rate: growth_rate.max(1),
        }
    }

    /// Wavefront iterations per tick.
    #[must_use]
    pub const fn growth_rate(&self) -> usize {
        self.growth_rate
    }

    /// Cells that would ignite on the next tick. Does not mutate the grid.
    ///
    /// Starting from every `Burning` cell, the frontier expands through the
    /// 8-neighbourhood for `growth_rate` iterations. Firebreak and agent cells
    /// are never entered, and a diagonal step is refused when both orthogonal
    /// neighbours of that step are firebreaks.
    #[must_use]
    pub fn pending_ignitions(&self, grid: &Grid) -> CellSet {
        let mut frontier = grid.positions_of(Cell::Burning);
        let mut visited = frontier.clone();
        let mut ignitions = CellSet::new();

        for _ in 0..self.growth_rate {
            if frontier.is_empty() {
                break;
            }
            let mut next_frontier = CellSet::new();
            for &pos in &frontier {
                for next in grid.neighbors8(pos) {
                    if visited.contains(&next) || grid.diagonal_blocked(pos, next) {
                        continue;
                    }
                    match grid.cell(next) {
                        Cell::Safe => {
                            ignitions.insert(next);
                        }
                        Cell::Burning => {}
                        Cell::Firebreak | Cell::AgentMarker => continue,
                    }
                    visited.insert(next);
                    next_frontier.insert(next);
                }
            }
            frontier = next_frontier;
        }

        ignitions
    }

    /// Set every listed cell to `Burning`. Returns how many cells changed.
    ///
    /// Cells that have since become firebreaks or agent markers are skipped.
    pub fn apply(&self, grid: &mut Grid, ignitions: &CellSet) -> usize {
        ignitions
            .iter()
            .filter(|&&pos| grid.get(pos) == Some(Cell::Safe) && grid.transition(pos, Cell::Burning))
            .count()
    }

    /// Compute and apply one tick of growth. Returns the ignited cells.
    pub fn spread(&self, grid: &mut Grid) -> CellSet {
        let ignitions = self.pending_ignitions(grid);
        self.apply(grid, &ignitions);
        ignitions
    }

    /// Whether the hazard can still reach any cell.
    #[must_use]
    pub fn can_expand(&self, grid: &Grid) -> bool {
        !self.pending_ignitions(grid).is_empty()
    }

    /// Spread until nothing new ignites or `max_steps` ticks elapse, with no
    /// agent action in between. Returns the number of ticks simulated.
    pub fn rollout(&self, grid: &mut Grid, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps {
            if self.spread(grid).is_empty() {
                break;
            }
            grid.advance_tick();
            steps += 1;
        }
        steps
    }

    /// Upper bound on ticks any rollout on `grid` can take.
    ///
    /// Every productive tick ignites at least one safe cell.
    #[must_use]
    pub fn rollout_limit(grid: &Grid) -> usize {
        grid.size() * grid.size() + 1
    }
}
