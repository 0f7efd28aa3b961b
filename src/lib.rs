//! # firebreak
//!
//! Grid fire-spread simulation with a firefighter agent.
//!
//! A hazard grows over a square grid while an agent seals cells behind it
//! with firebreaks. The agent's moves come from one of four strategies:
//! - a deterministic phase-based wall heuristic
//! - best-first branch and bound over a bounded lookahead tree
//! - iterated local search over short move plans
//! - variable neighborhood search over short move plans
//!
//! ## Example
//!
//! ```rust
//! use firebreak::prelude::*;
//!
//! let scenario = parse_input("3\n1 1\n0 0\n* * *\n* * *\n* * *\n").unwrap();
//! let config = FireConfig::builder()
//!     .strategy(StrategyKind::WallHeuristic)
//!     .build();
//! let agent = Agent::new(scenario.agent, config.build_strategy());
//! let mut driver = SimulationDriver::new(scenario.grid, agent, config.hazard_model());
//! driver.run_to_fixed_point(100).unwrap();
//! assert!(driver.is_finished());
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
    clippy::needless_range_loop,   // Sometimes range loops are clearer
)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod strategy;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{FireConfig, FireConfigBuilder, StopRule};
    pub use crate::engine::jidoka::{JidokaGuard, JidokaViolation};
    pub use crate::engine::rng::SimRng;
    pub use crate::engine::{
        Agent, Cell, CellCounts, CellSet, Grid, HazardModel, Move, Position, SimulationDriver,
        TickOutcome,
    };
    pub use crate::error::{FireError, FireResult};
    pub use crate::io::{load_input, parse_input, render_grid, write_grid, RunReport, Scenario};
    pub use crate::strategy::{SearchStats, SearchStatus, Strategy, StrategyKind};
}

/// Re-export for public API
pub use error::{FireError, FireResult};
