//! Phase-based wall heuristic.
//!
//! A deterministic finite-state policy with no lookahead. The agent first
//! closes in on the hazard, then lays firebreak lines by walking to a grid
//! wall, then to the opposite wall, then around the remaining walls.
//!
//! ```text
//! ApproachHazard ──(hazard ≤ threshold)──► ApproachWall1
//!       ApproachWall1 ──(wall reached)──► ApproachWall2   (opposite wall)
//!       ApproachWall2 ──(wall reached)──► CycleWalls      (clockwise)
//!          CycleWalls ──(wall reached)──► CycleWalls      (clockwise)
//! ```

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::trace;

use super::report::{SearchReport, SearchStats, SearchStatus};
use crate::engine::agent::is_legal_target;
use crate::engine::grid::{Cell, CellSet, Grid, Move, Position, MOVES};

/// One of the four grid boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Wall {
    /// Row 0.
    Top,
    /// Last column.
    Right,
    /// Last row.
    Bottom,
    /// Column 0.
    Left,
}

impl Wall {
    /// All walls, clockwise from the top.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// Next wall clockwise.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Top => Self::Right,
            Self::Right => Self::Bottom,
            Self::Bottom => Self::Left,
            Self::Left => Self::Top,
        }
    }

    /// The facing wall.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// Cells between `pos` and this wall on an `n`×`n` grid.
    #[must_use]
    pub const fn distance(self, pos: Position, n: usize) -> usize {
        match self {
            Self::Top => pos.row,
            Self::Right => n - 1 - pos.col,
            Self::Bottom => n - 1 - pos.row,
            Self::Left => pos.col,
        }
    }

    /// The closest wall; ties resolve clockwise from the top.
    #[must_use]
    pub fn nearest(pos: Position, n: usize) -> Self {
        let mut best = Self::Top;
        for wall in Self::ALL {
            if wall.distance(pos, n) < best.distance(pos, n) {
                best = wall;
            }
        }
        best
    }
}

/// Policy phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Walking towards the hazard.
    ApproachHazard,
    /// Walking to the first wall.
    ApproachWall1,
    /// Walking to the wall opposite the first.
    ApproachWall2,
    /// Visiting walls clockwise.
    CycleWalls,
}

/// Scoring weights for one phase group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallWeights {
    /// Weight on the reduction of hazard distance.
    pub hazard: f64,
    /// Weight on the reduction of target-wall distance.
    pub wall: f64,
    /// Bonus for repeating the previous direction.
    pub inertia: f64,
    /// Bonus for orthogonal steps.
    pub orthogonal: f64,
    /// Penalty for stepping back toward the previously visited wall.
    pub revisit_penalty: f64,
}

impl WallWeights {
    /// Weights used while approaching the hazard.
    #[must_use]
    pub const fn approach() -> Self {
        Self {
            hazard: 10.0,
            wall: 1.0,
            inertia: 0.5,
            orthogonal: 0.25,
            revisit_penalty: 2.0,
        }
    }

    /// Weights used while laying wall lines.
    #[must_use]
    pub const fn walls() -> Self {
        Self {
            hazard: 1.0,
            wall: 10.0,
            inertia: 0.5,
            orthogonal: 0.25,
            revisit_penalty: 2.0,
        }
    }
}

/// Parameters of the wall heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallParams {
    /// Weights for the hazard-approach phase.
    pub approach: WallWeights,
    /// Weights for the wall phases.
    pub walls: WallWeights,
    /// Chebyshev distance to the hazard that ends the approach phase.
    pub hazard_threshold: usize,
}

impl Default for WallParams {
    fn default() -> Self {
        Self {
            approach: WallWeights::approach(),
            walls: WallWeights::walls(),
            hazard_threshold: 2,
        }
    }
}

/// Deterministic phase-based heuristic.
#[derive(Debug, Clone)]
pub struct WallHeuristic {
    params: WallParams,
    phase: Phase,
    target: Option<Wall>,
    previous: Option<Wall>,
    last_move: Option<Move>,
    stats: SearchStats,
}

impl Default for WallHeuristic {
    fn default() -> Self {
        Self::new(WallParams::default())
    }
}

impl WallHeuristic {
    /// Create a heuristic in the approach phase.
    #[must_use]
    pub fn new(params: WallParams) -> Self {
        Self {
            params,
            phase: Phase::ApproachHazard,
            target: None,
            previous: None,
            last_move: None,
            stats: SearchStats::default(),
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Wall currently targeted, if any.
    #[must_use]
    pub const fn target_wall(&self) -> Option<Wall> {
        self.target
    }

    /// Cumulative statistics.
    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Pick the next position.
    pub fn decide(&mut self, position: Position, grid: &Grid, forbidden: &CellSet) -> Position {
        let start = Instant::now();
        let n = grid.size();
        let hazard = grid.positions_of(Cell::Burning);
        let hazard_distance = |p: Position| hazard.iter().map(|&h| p.chebyshev(h)).min();

        self.update_phase(position, n, hazard_distance(position));

        let weights = match self.phase {
            Phase::ApproachHazard => self.params.approach,
            _ => self.params.walls,
        };

        let mut best: Option<(f64, Move, Position)> = None;
        let mut scored = 0u64;
        for &mv in &MOVES {
            let Some(target) = grid.offset(position, mv) else {
                continue;
            };
            if !is_legal_target(grid, target, forbidden) {
                continue;
            }
            scored += 1;

            let mut score = 0.0;
            if let (Some(from), Some(to)) = (hazard_distance(position), hazard_distance(target)) {
                score += weights.hazard * (from as f64 - to as f64);
            }
            if let Some(wall) = self.target {
                score += weights.wall
                    * (wall.distance(position, n) as f64 - wall.distance(target, n) as f64);
            }
            if self.last_move == Some(mv) {
                score += weights.inertia;
            }
            if mv.is_orthogonal() {
                score += weights.orthogonal;
            }
            if let Some(prev) = self.previous {
                if prev.distance(target, n) < prev.distance(position, n) {
                    score -= weights.revisit_penalty;
                }
            }

            if best.map_or(true, |(s, _, _)| score > s) {
                best = Some((score, mv, target));
            }
        }

        let (next, status) = match best {
            Some((score, mv, target)) => {
                trace!(phase = ?self.phase, ?mv, score, "wall heuristic move");
                self.last_move = Some(mv);
                (target, SearchStatus::SolutionFound)
            }
            None => (position, SearchStatus::Fallback),
        };

        self.stats.record(SearchReport {
            evaluated: scored,
            status,
            elapsed: start.elapsed(),
            depth: 0,
            counts: None,
            contained: None,
        });
        next
    }

    fn update_phase(&mut self, position: Position, n: usize, hazard_distance: Option<usize>) {
        if self.phase == Phase::ApproachHazard {
            let close = hazard_distance.map_or(true, |d| d <= self.params.hazard_threshold);
            if !close {
                return;
            }
            self.phase = Phase::ApproachWall1;
            self.target = Some(Wall::nearest(position, n));
        }

        let Some(wall) = self.target else {
            return;
        };
        if wall.distance(position, n) > 0 {
            return;
        }

        let next = match self.phase {
            Phase::ApproachWall1 => {
                self.phase = Phase::ApproachWall2;
                wall.opposite()
            }
            _ => {
                self.phase = Phase::CycleWalls;
                wall.clockwise()
            }
        };
        trace!(reached = ?wall, next = ?next, "wall reached");
        self.previous = Some(wall);
        self.target = Some(next);
    }
}
