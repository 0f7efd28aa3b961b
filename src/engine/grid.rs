//! Square cell grid.
//!
//! Holds the N×N cell matrix and the tick counter, plus the query and
//! mutation primitives the hazard model, the agent and the strategies share.
//!
//! # Copy-on-write rows
//!
//! Search strategies clone the grid for every node or plan they explore.
//! Rows are stored behind `Arc`, so a clone copies N row handles and a
//! mutation copies only the row it touches (`Arc::make_mut`).
//!
//! # State lattice
//!
//! ```text
//! Safe ──► Burning
//!   │
//!   ├────► Firebreak ◄── AgentMarker
//!   │                        ▲
//!   └────────────────────────┘
//! ```
//!
//! [`Grid::transition`] refuses every other transition, so a cell that is
//! `Burning` or `Firebreak` never reverts.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use crate::error::{FireError, FireResult};

/// Ordered coordinate set. Ordered so iteration is reproducible.
pub type CellSet = BTreeSet<Position>;

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cell {
    /// Not yet affected.
    Safe,
    /// Consumed by the hazard.
    Burning,
    /// Barrier built by the agent; the hazard never enters it.
    Firebreak,
    /// The agent currently stands here.
    AgentMarker,
}

impl Cell {
    /// Token used by the text formats.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Safe => "*",
            Self::Burning => "-",
            Self::Firebreak => "+",
            Self::AgentMarker => "x",
        }
    }

    /// Parse a text token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "*" => Some(Self::Safe),
            "-" => Some(Self::Burning),
            "+" => Some(Self::Firebreak),
            "x" => Some(Self::AgentMarker),
            _ => None,
        }
    }

    /// Whether `self → next` is allowed by the state lattice.
    ///
    /// Identity transitions are allowed (and are no-ops).
    #[must_use]
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Safe, _)
                | (Self::AgentMarker, Self::Firebreak | Self::AgentMarker)
                | (Self::Burning, Self::Burning)
                | (Self::Firebreak, Self::Firebreak)
        )
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Grid coordinate (row, column), zero-based.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chebyshev (king-move) distance.
    #[must_use]
    pub const fn chebyshev(self, other: Self) -> usize {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        if dr > dc {
            dr
        } else {
            dc
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Relative single-tick step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Row delta in `-1..=1`.
    pub d_row: i8,
    /// Column delta in `-1..=1`.
    pub d_col: i8,
}

impl Move {
    /// Stay in place.
    pub const STAY: Self = Self::new(0, 0);

    /// Create a move from its deltas.
    #[must_use]
    pub const fn new(d_row: i8, d_col: i8) -> Self {
        Self { d_row, d_col }
    }

    /// The step from `from` to `to`, if they are at most one cell apart.
    #[must_use]
    pub fn between(from: Position, to: Position) -> Option<Self> {
        if from.chebyshev(to) > 1 {
            return None;
        }
        let d_row = if to.row > from.row {
            1
        } else if to.row < from.row {
            -1
        } else {
            0
        };
        let d_col = if to.col > from.col {
            1
        } else if to.col < from.col {
            -1
        } else {
            0
        };
        Some(Self::new(d_row, d_col))
    }

    /// True for the zero move.
    #[must_use]
    pub const fn is_stay(self) -> bool {
        self.d_row == 0 && self.d_col == 0
    }

    /// True when both deltas are non-zero.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        self.d_row != 0 && self.d_col != 0
    }

    /// True for the four axis-aligned steps.
    #[must_use]
    pub const fn is_orthogonal(self) -> bool {
        (self.d_row == 0) != (self.d_col == 0)
    }
}

/// Candidate moves in evaluation order: stay first, then the 8 directions.
pub const MOVES: [Move; 9] = [
    Move::STAY,
    Move::new(-1, -1),
    Move::new(-1, 0),
    Move::new(-1, 1),
    Move::new(0, -1),
    Move::new(0, 1),
    Move::new(1, -1),
    Move::new(1, 0),
    Move::new(1, 1),
];

/// The 8-neighbourhood directions.
pub const NEIGHBORS8: [Move; 8] = [
    Move::new(-1, -1),
    Move::new(-1, 0),
    Move::new(-1, 1),
    Move::new(0, -1),
    Move::new(0, 1),
    Move::new(1, -1),
    Move::new(1, 0),
    Move::new(1, 1),
];

/// Per-state cell counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellCounts {
    /// Safe cells.
    pub safe: usize,
    /// Burning cells.
    pub burning: usize,
    /// Firebreak cells.
    pub firebreak: usize,
    /// Cells holding the agent marker.
    pub agent: usize,
}

/// Square grid of cells plus a tick counter.
///
/// Deserialization goes through [`Grid::from_rows`], so a decoded grid is
/// always non-empty and square.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    rows: Vec<Arc<Vec<Cell>>>,
    tick: u64,
}

/// Unchecked wire form of [`Grid`].
#[derive(Deserialize)]
struct RawGrid {
    rows: Vec<Vec<Cell>>,
    #[serde(default)]
    tick: u64,
}

impl TryFrom<RawGrid> for Grid {
    type Error = FireError;

    fn try_from(raw: RawGrid) -> FireResult<Self> {
        let mut grid = Self::from_rows(raw.rows)?;
        grid.tick = raw.tick;
        Ok(grid)
    }
}

impl Grid {
    /// Create an all-`Safe` grid of the given size.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "Grid size must be positive");
        let row = Arc::new(vec![Cell::Safe; size]);
        Self {
            rows: vec![row; size],
            tick: 0,
        }
    }

    /// Build a grid from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns [`FireError::InputFormat`] if the matrix is empty or not square.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> FireResult<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(FireError::input("grid must not be empty"));
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(FireError::input(format!(
                "grid is not square: row {} has {} cells, expected {n}",
                idx + 1,
                row.len()
            )));
        }
        Ok(Self {
            rows: rows.into_iter().map(Arc::new).collect(),
            tick: 0,
        })
    }

    /// Side length N.
    #[must_use]
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Current tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance the tick counter by one.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Whether signed coordinates fall inside the grid.
    #[must_use]
    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        let n = self.size() as isize;
        (0..n).contains(&row) && (0..n).contains(&col)
    }

    /// Apply a relative move, returning `None` if it leaves the grid.
    #[must_use]
    pub fn offset(&self, pos: Position, mv: Move) -> Option<Position> {
        let row = pos.row as isize + isize::from(mv.d_row);
        let col = pos.col as isize + isize::from(mv.d_col);
        if self.in_bounds(row, col) {
            Some(Position::new(row as usize, col as usize))
        } else {
            None
        }
    }

    /// Cell at `pos`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.rows.get(pos.row).and_then(|r| r.get(pos.col)).copied()
    }

    /// Cell at an in-bounds `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    #[must_use]
    pub fn cell(&self, pos: Position) -> Cell {
        self.rows[pos.row][pos.col]
    }

    /// True if `pos` is in bounds and `Safe`.
    #[must_use]
    pub fn is_safe(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Safe)
    }

    /// Move a cell along the state lattice.
    ///
    /// Returns `false` (and leaves the grid untouched) for out-of-bounds
    /// positions and for transitions the lattice forbids.
    pub fn transition(&mut self, pos: Position, next: Cell) -> bool {
        match self.get(pos) {
            Some(current) if current == next => true,
            Some(current) if current.can_become(next) => {
                Arc::make_mut(&mut self.rows[pos.row])[pos.col] = next;
                true
            }
            _ => false,
        }
    }

    /// Overwrite a cell without lattice checks. Reserved for loading.
    pub(crate) fn place(&mut self, pos: Position, cell: Cell) {
        if self.get(pos).is_some() {
            Arc::make_mut(&mut self.rows[pos.row])[pos.col] = cell;
        }
    }

    /// All coordinates currently in `state`.
    #[must_use]
    pub fn positions_of(&self, state: Cell) -> CellSet {
        self.iter_cells()
            .filter(|&(_, c)| c == state)
            .map(|(p, _)| p)
            .collect()
    }

    /// Count cells per state.
    #[must_use]
    pub fn counts(&self) -> CellCounts {
        let mut counts = CellCounts::default();
        for row in &self.rows {
            for cell in row.iter() {
                match cell {
                    Cell::Safe => counts.safe += 1,
                    Cell::Burning => counts.burning += 1,
                    Cell::Firebreak => counts.firebreak += 1,
                    Cell::AgentMarker => counts.agent += 1,
                }
            }
        }
        counts
    }

    /// In-bounds neighbours of `pos` over the 8-neighbourhood.
    pub fn neighbors8(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        NEIGHBORS8
            .iter()
            .filter_map(move |&mv| self.offset(pos, mv))
    }

    /// True if a diagonal step `from → to` is sealed by firebreaks on both
    /// orthogonal sides. Orthogonal steps are never blocked.
    #[must_use]
    pub fn diagonal_blocked(&self, from: Position, to: Position) -> bool {
        if from.row == to.row || from.col == to.col {
            return false;
        }
        let side_a = Position::new(from.row, to.col);
        let side_b = Position::new(to.row, from.col);
        self.get(side_a) == Some(Cell::Firebreak) && self.get(side_b) == Some(Cell::Firebreak)
    }

    /// True iff no `Safe` cell is reachable from any `Burning` cell.
    ///
    /// Breadth-first flood fill over the 8-neighbourhood that never enters
    /// `Firebreak` or `AgentMarker` cells and honours the diagonal seal.
    #[must_use]
    pub fn is_contained(&self) -> bool {
        let n = self.size();
        let mut seen = vec![false; n * n];
        let mut queue: VecDeque<Position> = VecDeque::new();

        for (pos, cell) in self.iter_cells() {
            if cell == Cell::Burning {
                seen[pos.row * n + pos.col] = true;
                queue.push_back(pos);
            }
        }

        while let Some(pos) = queue.pop_front() {
            for next in self.neighbors8(pos) {
                let idx = next.row * n + next.col;
                if seen[idx] {
                    continue;
                }
                match self.cell(next) {
                    Cell::Firebreak | Cell::AgentMarker => continue,
                    Cell::Safe | Cell::Burning => {}
                }
                if self.diagonal_blocked(pos, next) {
                    continue;
                }
                if self.cell(next) == Cell::Safe {
                    return false;
                }
                seen[idx] = true;
                queue.push_back(next);
            }
        }

        true
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Iterate every `(position, cell)` pair in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(move |(j, &c)| (Position::new(i, j), c))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(lines: &[&str]) -> Grid {
        let rows = lines
            .iter()
            .map(|l| {
                l.split_whitespace()
                    .map(|t| Cell::from_token(t).unwrap())
                    .collect()
            })
            .collect();
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_new_grid_is_all_safe() {
        let grid = Grid::new(4);
        assert_eq!(grid.size(), 4);
        assert_eq!(grid.tick(), 0);
        let counts = grid.counts();
        assert_eq!(counts.safe, 16);
        assert_eq!(counts.burning + counts.firebreak + counts.agent, 0);
    }

    #[test]
    fn test_from_rows_rejects_non_square() {
        let rows = vec![vec![Cell::Safe; 3], vec![Cell::Safe; 2], vec![Cell::Safe; 3]];
        let err = Grid::from_rows(rows).unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_from_rows_rejects_empty() {
        assert!(Grid::from_rows(Vec::new()).is_err());
    }

    #[test]
    fn test_deserialize_keeps_cells_and_tick() {
        let mut grid = Grid::new(3);
        grid.transition(Position::new(1, 1), Cell::Burning);
        grid.advance_tick();
        let json = serde_json::to_string(&grid).unwrap();
        let decoded: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, grid);
        assert_eq!(decoded.tick(), 1);
    }

    #[test]
    fn test_deserialize_rejects_malformed_rows() {
        let mut value = serde_json::to_value(Grid::new(3)).unwrap();
        value["rows"][1].as_array_mut().unwrap().pop();
        let err = serde_json::from_value::<Grid>(value).unwrap_err();
        assert!(err.to_string().contains("not square"));

        let empty = serde_json::json!({ "rows": [], "tick": 0 });
        assert!(serde_json::from_value::<Grid>(empty).is_err());
    }

    #[test]
    fn test_in_bounds() {
        let grid = Grid::new(3);
        assert!(grid.in_bounds(0, 0));
        assert!(grid.in_bounds(2, 2));
        assert!(!grid.in_bounds(-1, 0));
        assert!(!grid.in_bounds(0, 3));
    }

    #[test]
    fn test_offset_respects_bounds() {
        let grid = Grid::new(3);
        let corner = Position::new(0, 0);
        assert_eq!(grid.offset(corner, Move::new(-1, 0)), None);
        assert_eq!(grid.offset(corner, Move::new(1, 1)), Some(Position::new(1, 1)));
        assert_eq!(grid.offset(corner, Move::STAY), Some(corner));
    }

    #[test]
    fn test_token_table_round_trip() {
        for cell in [Cell::Safe, Cell::Burning, Cell::Firebreak, Cell::AgentMarker] {
            assert_eq!(Cell::from_token(cell.token()), Some(cell));
        }
        assert_eq!(Cell::from_token("#"), None);
    }

    #[test]
    fn test_lattice_transitions() {
        assert!(Cell::Safe.can_become(Cell::Burning));
        assert!(Cell::Safe.can_become(Cell::Firebreak));
        assert!(Cell::Safe.can_become(Cell::AgentMarker));
        assert!(Cell::AgentMarker.can_become(Cell::Firebreak));
        assert!(!Cell::AgentMarker.can_become(Cell::Safe));
        assert!(!Cell::AgentMarker.can_become(Cell::Burning));
        assert!(!Cell::Burning.can_become(Cell::Safe));
        assert!(!Cell::Burning.can_become(Cell::Firebreak));
        assert!(!Cell::Firebreak.can_become(Cell::Safe));
        assert!(!Cell::Firebreak.can_become(Cell::AgentMarker));
    }

    #[test]
    fn test_transition_refuses_regression() {
        let mut grid = Grid::new(2);
        let p = Position::new(0, 0);
        assert!(grid.transition(p, Cell::Burning));
        assert!(!grid.transition(p, Cell::Safe));
        assert!(!grid.transition(p, Cell::Firebreak));
        assert_eq!(grid.cell(p), Cell::Burning);
        assert!(!grid.transition(Position::new(5, 5), Cell::Burning));
    }

    #[test]
    fn test_clone_is_copy_on_write() {
        let mut original = Grid::new(3);
        let clone = original.clone();
        assert!(original.transition(Position::new(1, 1), Cell::Burning));
        assert_eq!(clone.cell(Position::new(1, 1)), Cell::Safe);
        assert_eq!(original.cell(Position::new(1, 1)), Cell::Burning);
    }

    #[test]
    fn test_positions_of_and_counts() {
        let grid = grid_from(&["* - *", "+ x *", "* * -"]);
        let burning = grid.positions_of(Cell::Burning);
        assert_eq!(burning.len(), 2);
        assert!(burning.contains(&Position::new(0, 1)));
        assert!(burning.contains(&Position::new(2, 2)));
        let counts = grid.counts();
        assert_eq!(counts.safe, 5);
        assert_eq!(counts.burning, 2);
        assert_eq!(counts.firebreak, 1);
        assert_eq!(counts.agent, 1);
    }

    #[test]
    fn test_chebyshev() {
        let a = Position::new(1, 1);
        assert_eq!(a.chebyshev(Position::new(4, 2)), 3);
        assert_eq!(a.chebyshev(a), 0);
    }

    #[test]
    fn test_move_between() {
        let from = Position::new(2, 2);
        assert_eq!(Move::between(from, Position::new(1, 3)), Some(Move::new(-1, 1)));
        assert_eq!(Move::between(from, from), Some(Move::STAY));
        assert_eq!(Move::between(from, Position::new(0, 2)), None);
    }

    #[test]
    fn test_move_kinds() {
        assert!(Move::STAY.is_stay());
        assert!(Move::new(1, 1).is_diagonal());
        assert!(Move::new(0, -1).is_orthogonal());
        assert!(!Move::STAY.is_orthogonal());
        assert!(!Move::new(-1, 1).is_orthogonal());
    }

    #[test]
    fn test_diagonal_blocked_needs_both_sides() {
        let grid = grid_from(&["- +", "+ *"]);
        assert!(grid.diagonal_blocked(Position::new(0, 0), Position::new(1, 1)));
        let grid = grid_from(&["- +", "* *"]);
        assert!(!grid.diagonal_blocked(Position::new(0, 0), Position::new(1, 1)));
        assert!(!grid.diagonal_blocked(Position::new(0, 0), Position::new(1, 0)));
    }

    #[test]
    fn test_contained_inside_firebreak_ring() {
        let grid = grid_from(&[
            "* * * * *",
            "* + + + *",
            "* + - + *",
            "* + + + *",
            "* * * * *",
        ]);
        assert!(grid.is_contained());
        assert_eq!(grid.is_contained(), grid.is_contained());
    }

    #[test]
    fn test_not_contained_with_gap() {
        let grid = grid_from(&[
            "* * * * *",
            "* + * + *",
            "* + - + *",
            "* + + + *",
            "* * * * *",
        ]);
        assert!(!grid.is_contained());
    }

    #[test]
    fn test_diagonal_staircase_seals() {
        let grid = grid_from(&["- + *", "+ * *", "* * *"]);
        assert!(grid.is_contained());
    }

    #[test]
    fn test_no_hazard_is_contained() {
        assert!(Grid::new(3).is_contained());
    }

    #[test]
    fn test_iter_cells_row_major() {
        let grid = Grid::new(2);
        let order: Vec<Position> = grid.iter_cells().map(|(p, _)| p).collect();
        assert_eq!(
            order,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 0),
                Position::new(1, 1)
            ]
        );
    }
}
