//! The firefighter agent.
//!
//! Owns its position and its strategy. Builds a barrier on its own cell at
//! the start of every tick and moves one step per tick. Illegal move requests
//! are corrected silently: the agent stays put.

use tracing::trace;

use super::grid::{Cell, CellSet, Grid, Move, Position};
use crate::strategy::Strategy;

/// Whether the agent may step onto `pos`: in bounds, `Safe`, and not
/// forecast to ignite.
#[must_use]
pub fn is_legal_target(grid: &Grid, pos: Position, forbidden: &CellSet) -> bool {
    grid.is_safe(pos) && !forbidden.contains(&pos)
}

/// Mobile agent that converts cells it occupies into firebreaks.
#[derive(Debug, Clone)]
pub struct Agent {
    position: Position,
    strategy: Strategy,
}

impl Agent {
    /// Create an agent at `position` driven by `strategy`.
    #[must_use]
    pub const fn new(position: Position, strategy: Strategy) -> Self {
        Self { position, strategy }
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// The move-selection strategy.
    #[must_use]
    pub const fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Mutable access to the strategy.
    pub fn strategy_mut(&mut self) -> &mut Strategy {
        &mut self.strategy
    }

    /// Mark the agent's cell with the agent marker if it is still safe.
    pub fn mark(&self, grid: &mut Grid) {
        if grid.is_safe(self.position) {
            grid.transition(self.position, Cell::AgentMarker);
        }
    }

    /// Convert the agent's current cell to a firebreak.
    ///
    /// Returns `true` if a new firebreak was built.
    pub fn build_barrier(&self, grid: &mut Grid) -> bool {
        match grid.get(self.position) {
            Some(Cell::Safe | Cell::AgentMarker) => grid.transition(self.position, Cell::Firebreak),
            _ => false,
        }
    }

    /// Move to an adjacent target if it is legal.
    ///
    /// On success the new cell is marked `AgentMarker`. On rejection nothing
    /// changes and `false` is returned.
    pub fn move_to(&mut self, grid: &mut Grid, target: Position, forbidden: &CellSet) -> bool {
        if self.position.chebyshev(target) > 1 || !is_legal_target(grid, target, forbidden) {
            trace!(from = %self.position, to = %target, "move rejected, agent stays");
            return false;
        }
        self.position = target;
        grid.transition(target, Cell::AgentMarker)
    }

    /// Move by a relative step if it is legal.
    pub fn step(&mut self, grid: &mut Grid, mv: Move, forbidden: &CellSet) -> bool {
        match grid.offset(self.position, mv) {
            Some(target) if !mv.is_stay() => self.move_to(grid, target, forbidden),
            _ => false,
        }
    }

    /// Ask the strategy for the next position and commit it if legal.
    ///
    /// Returns the position after the move.
    pub fn act(&mut self, grid: &mut Grid, forbidden: &CellSet) -> Position {
        let target = self.strategy.decide(self.position, grid, forbidden);
        if target != self.position {
            self.move_to(grid, target, forbidden);
        }
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::WallHeuristic;

    fn agent_at(row: usize, col: usize) -> Agent {
        Agent::new(Position::new(row, col), Strategy::Wall(WallHeuristic::default()))
    }

    #[test]
    fn test_build_barrier_converts_marker() {
        let mut grid = Grid::new(3);
        let agent = agent_at(1, 1);
        agent.mark(&mut grid);
        assert_eq!(grid.cell(Position::new(1, 1)), Cell::AgentMarker);
        assert!(agent.build_barrier(&mut grid));
        assert_eq!(grid.cell(Position::new(1, 1)), Cell::Firebreak);
        assert!(!agent.build_barrier(&mut grid));
    }

    #[test]
    fn test_build_barrier_never_on_burning() {
        let mut grid = Grid::new(3);
        grid.transition(Position::new(0, 0), Cell::Burning);
        let agent = agent_at(0, 0);
        assert!(!agent.build_barrier(&mut grid));
        assert_eq!(grid.cell(Position::new(0, 0)), Cell::Burning);
    }

    #[test]
    fn test_move_to_legal() {
        let mut grid = Grid::new(3);
        let mut agent = agent_at(0, 0);
        assert!(agent.move_to(&mut grid, Position::new(1, 1), &CellSet::new()));
        assert_eq!(agent.position(), Position::new(1, 1));
        assert_eq!(grid.cell(Position::new(1, 1)), Cell::AgentMarker);
    }

    #[test]
    fn test_move_rejected_when_forbidden() {
        let mut grid = Grid::new(3);
        let mut agent = agent_at(0, 0);
        let mut forbidden = CellSet::new();
        forbidden.insert(Position::new(0, 1));
        assert!(!agent.move_to(&mut grid, Position::new(0, 1), &forbidden));
        assert_eq!(agent.position(), Position::new(0, 0));
        assert_eq!(grid.cell(Position::new(0, 1)), Cell::Safe);
    }

    #[test]
    fn test_move_rejected_when_not_safe() {
        let mut grid = Grid::new(3);
        grid.transition(Position::new(0, 1), Cell::Firebreak);
        grid.transition(Position::new(1, 0), Cell::Burning);
        let mut agent = agent_at(0, 0);
        assert!(!agent.move_to(&mut grid, Position::new(0, 1), &CellSet::new()));
        assert!(!agent.move_to(&mut grid, Position::new(1, 0), &CellSet::new()));
        assert!(!agent.move_to(&mut grid, Position::new(7, 7), &CellSet::new()));
        assert_eq!(agent.position(), Position::new(0, 0));
    }

    #[test]
    fn test_move_rejected_when_not_adjacent() {
        let mut grid = Grid::new(4);
        let mut agent = agent_at(0, 0);
        assert!(!agent.move_to(&mut grid, Position::new(2, 2), &CellSet::new()));
        assert_eq!(agent.position(), Position::new(0, 0));
        assert_eq!(grid.cell(Position::new(2, 2)), Cell::Safe);
    }

    #[test]
    fn test_step_relative() {
        let mut grid = Grid::new(3);
        let mut agent = agent_at(1, 1);
        assert!(agent.step(&mut grid, Move::new(-1, 1), &CellSet::new()));
        assert_eq!(agent.position(), Position::new(0, 2));
        assert!(!agent.step(&mut grid, Move::new(-1, 0), &CellSet::new()));
        assert!(!agent.step(&mut grid, Move::STAY, &CellSet::new()));
        assert_eq!(agent.position(), Position::new(0, 2));
    }

    #[test]
    fn test_is_legal_target() {
        let mut grid = Grid::new(2);
        let mut forbidden = CellSet::new();
        forbidden.insert(Position::new(1, 1));
        grid.transition(Position::new(0, 1), Cell::AgentMarker);
        assert!(is_legal_target(&grid, Position::new(0, 0), &forbidden));
        assert!(!is_legal_target(&grid, Position::new(0, 1), &forbidden));
        assert!(!is_legal_target(&grid, Position::new(1, 1), &forbidden));
        assert!(!is_legal_target(&grid, Position::new(2, 0), &forbidden));
    }
}
