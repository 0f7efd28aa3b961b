//! Simulation driver.
//!
//! Sequences one tick in a fixed order:
//!
//! ```text
//! build barrier → spread hazard → forecast → agent move → tick + 1
//! ```
//!
//! The forecast handed to the strategy is computed after this tick's spread,
//! so the agent never walks into a cell that is about to ignite.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::agent::Agent;
use super::grid::{Grid, Position};
use super::hazard::HazardModel;
use super::jidoka::{JidokaConfig, JidokaGuard};
use crate::error::FireResult;
use crate::io::writer::RunReport;

/// Summary of one completed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// Tick counter after the tick.
    pub tick: u64,
    /// Cells ignited during the tick.
    pub ignited: usize,
    /// Cells forecast to ignite next tick.
    pub forecast: usize,
    /// Agent position after its move.
    pub agent: Position,
}

/// Owns the live grid, the agent and the hazard model.
#[derive(Debug, Clone)]
pub struct SimulationDriver {
    grid: Grid,
    agent: Agent,
    hazard: HazardModel,
    guard: Option<JidokaGuard>,
    started: Instant,
}

impl SimulationDriver {
    /// Create a driver. Marks the agent's start cell if it is still safe.
    #[must_use]
    pub fn new(mut grid: Grid, agent: Agent, hazard: HazardModel) -> Self {
        agent.mark(&mut grid);
        Self {
            grid,
            agent,
            hazard,
            guard: None,
            started: Instant::now(),
        }
    }

    /// Enable or disable the Jidoka guard for [`Self::try_tick`].
    #[must_use]
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.guard = enabled.then(|| JidokaGuard::new(JidokaConfig::default()));
        self
    }

    /// The live grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The agent.
    #[must_use]
    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    /// The hazard model.
    #[must_use]
    pub const fn hazard(&self) -> &HazardModel {
        &self.hazard
    }

    /// Run one tick.
    pub fn tick(&mut self) -> TickOutcome {
        self.agent.build_barrier(&mut self.grid);

        let ignited = self.hazard.spread(&mut self.grid);
        let forecast = self.hazard.pending_ignitions(&self.grid);

        let agent = self.agent.act(&mut self.grid, &forecast);
        self.grid.advance_tick();

        let outcome = TickOutcome {
            tick: self.grid.tick(),
            ignited: ignited.len(),
            forecast: forecast.len(),
            agent,
        };
        debug!(
            tick = outcome.tick,
            ignited = outcome.ignited,
            forecast = outcome.forecast,
            agent = %outcome.agent,
            "tick complete"
        );
        outcome
    }

    /// Run one tick and, when enabled, verify lattice invariants.
    ///
    /// # Errors
    ///
    /// Returns `FireError::InvariantViolation` if the guard trips.
    pub fn try_tick(&mut self) -> FireResult<TickOutcome> {
        if let Some(guard) = self.guard.as_mut() {
            // Baseline before the first tick.
            guard.check(&self.grid).map_err(|v| {
                warn!(violation = %v, "jidoka guard tripped");
                v
            })?;
        }
        let outcome = self.tick();
        if let Some(guard) = self.guard.as_mut() {
            guard.check(&self.grid).map_err(|v| {
                warn!(violation = %v, "jidoka guard tripped");
                v
            })?;
        }
        Ok(outcome)
    }

    /// True when the hazard cannot expand any further.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.hazard.can_expand(&self.grid)
    }

    /// Whether the hazard could still expand after the agent seals its
    /// current cell. Evaluated on a scratch clone.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        let mut scratch = self.grid.clone();
        self.agent.build_barrier(&mut scratch);
        !self.hazard.can_expand(&scratch)
    }

    /// Tick while the hazard can still expand, at most `max_steps` times.
    ///
    /// Returns the number of ticks run.
    ///
    /// # Errors
    ///
    /// Propagates invariant violations from [`Self::try_tick`].
    pub fn run_to_fixed_point(&mut self, max_steps: usize) -> FireResult<usize> {
        self.run_while(max_steps, Self::is_finished)
    }

    /// Like [`Self::run_to_fixed_point`], but stops as soon as the next
    /// barrier would already seal the hazard.
    ///
    /// # Errors
    ///
    /// Propagates invariant violations from [`Self::try_tick`].
    pub fn run_until_stable(&mut self, max_steps: usize) -> FireResult<usize> {
        self.run_while(max_steps, Self::is_stable)
    }

    /// Tick until the grid reaches `target` ticks, the hazard stops, or
    /// `max_steps` ticks have run.
    ///
    /// # Errors
    ///
    /// Propagates invariant violations from [`Self::try_tick`].
    pub fn run_to_tick(&mut self, target: u64, max_steps: usize) -> FireResult<usize> {
        self.run_while(max_steps, |d| d.grid.tick() >= target || d.is_finished())
    }

    fn run_while(&mut self, max_steps: usize, done: impl Fn(&Self) -> bool) -> FireResult<usize> {
        let mut steps = 0;
        while steps < max_steps && !done(self) {
            self.try_tick()?;
            steps += 1;
        }
        info!(
            steps,
            tick = self.grid.tick(),
            finished = self.is_finished(),
            "run stopped"
        );
        Ok(steps)
    }

    /// Build a run report from the current state.
    #[must_use]
    pub fn report(&self) -> RunReport {
        RunReport::from_run(
            &self.grid,
            self.agent.strategy(),
            self.is_finished(),
            self.started.elapsed(),
        )
    }
}
