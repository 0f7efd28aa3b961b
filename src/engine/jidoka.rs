//! Jidoka (自働化) - stop-on-anomaly guard for the grid lattice.
//!
//! After every tick the guard compares the grid with the previous snapshot
//! and stops the line if the monotonic state lattice was broken:
//!
//! 1. **Burned count decreased**
//! 2. **Firebreak count decreased**
//! 3. **Cell regressed**: a `Burning` or `Firebreak` cell changed state, or
//!    an `AgentMarker` cell became anything but a firebreak
//!
//! The guard never repairs the grid; it reports the first violation found.

use serde::{Deserialize, Serialize};

use super::grid::{Cell, CellCounts, Grid, Position};
use crate::error::FireError;

/// Jidoka violation types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JidokaViolation {
    /// Fewer burning cells than before.
    BurnedDecreased {
        /// Tick of detection.
        tick: u64,
        /// Count at the previous check.
        before: usize,
        /// Count now.
        after: usize,
    },
    /// Fewer firebreak cells than before.
    FirebreakDecreased {
        /// Tick of detection.
        tick: u64,
        /// Count at the previous check.
        before: usize,
        /// Count now.
        after: usize,
    },
    /// A cell moved down the state lattice.
    CellRegressed {
        /// Tick of detection.
        tick: u64,
        /// Offending cell.
        position: Position,
        /// State at the previous check.
        from: Cell,
        /// State now.
        to: Cell,
    },
}

impl JidokaViolation {
    /// Tick at which the violation was detected.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        match self {
            Self::BurnedDecreased { tick, .. }
            | Self::FirebreakDecreased { tick, .. }
            | Self::CellRegressed { tick, .. } => *tick,
        }
    }
}

impl std::fmt::Display for JidokaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BurnedDecreased { before, after, .. } => {
                write!(f, "burned count decreased from {before} to {after}")
            }
            Self::FirebreakDecreased { before, after, .. } => {
                write!(f, "firebreak count decreased from {before} to {after}")
            }
            Self::CellRegressed { position, from, to, .. } => {
                write!(f, "cell {position} regressed from '{from}' to '{to}'")
            }
        }
    }
}

impl From<JidokaViolation> for FireError {
    fn from(v: JidokaViolation) -> Self {
        Self::InvariantViolation {
            tick: v.tick(),
            message: v.to_string(),
        }
    }
}

/// Jidoka guard configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JidokaConfig {
    /// Check that burned and firebreak counts never decrease.
    pub check_counts: bool,
    /// Check every cell against the lattice.
    pub check_cells: bool,
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_counts: true,
            check_cells: true,
        }
    }
}

/// Jidoka guard for lattice monotonicity.
///
/// # Example
///
/// ```rust
/// use firebreak::engine::grid::Grid;
/// use firebreak::engine::jidoka::{JidokaConfig, JidokaGuard};
///
/// let mut guard = JidokaGuard::new(JidokaConfig::default());
/// let grid = Grid::new(3);
///
/// // First check records the baseline
/// assert!(guard.check(&grid).is_ok());
/// assert!(guard.check(&grid).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct JidokaGuard {
    config: JidokaConfig,
    baseline: Option<(Grid, CellCounts)>,
}

impl JidokaGuard {
    /// Create a new guard with the given configuration.
    #[must_use]
    pub const fn new(config: JidokaConfig) -> Self {
        Self {
            config,
            baseline: None,
        }
    }

    /// Check `grid` against the last snapshot, then take a new snapshot.
    ///
    /// The first call only records the baseline.
    ///
    /// # Errors
    ///
    /// Returns the first [`JidokaViolation`] found. The baseline is not
    /// advanced on failure.
    pub fn check(&mut self, grid: &Grid) -> Result<(), JidokaViolation> {
        let counts = grid.counts();
        if let Some((previous, before)) = &self.baseline {
            if self.config.check_counts {
                Self::check_counts(grid.tick(), before, &counts)?;
            }
            if self.config.check_cells {
                Self::check_cells(previous, grid)?;
            }
        }
        self.baseline = Some((grid.clone(), counts));
        Ok(())
    }

    fn check_counts(tick: u64, before: &CellCounts, after: &CellCounts) -> Result<(), JidokaViolation> {
        if after.burning < before.burning {
            return Err(JidokaViolation::BurnedDecreased {
                tick,
                before: before.burning,
                after: after.burning,
            });
        }
        if after.firebreak < before.firebreak {
            return Err(JidokaViolation::FirebreakDecreased {
                tick,
                before: before.firebreak,
                after: after.firebreak,
            });
        }
        Ok(())
    }

    fn check_cells(previous: &Grid, grid: &Grid) -> Result<(), JidokaViolation> {
        for ((position, from), (_, to)) in previous.iter_cells().zip(grid.iter_cells()) {
            if !from.can_become(to) {
                return Err(JidokaViolation::CellRegressed {
                    tick: grid.tick(),
                    position,
                    from,
                    to,
                });
            }
        }
        Ok(())
    }

    /// Forget the baseline.
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }
}
