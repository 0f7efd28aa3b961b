//! Core simulation engine.
//!
//! - Square cell grid with a monotonic state lattice
//! - Frontier-based hazard spread
//! - The firefighter agent
//! - Tick sequencing and run loops
//! - Deterministic RNG for stochastic strategies
//! - Jidoka guard for stop-on-error

pub mod agent;
pub mod driver;
pub mod grid;
pub mod hazard;
pub mod jidoka;
pub mod rng;

pub use agent::Agent;
pub use driver::{SimulationDriver, TickOutcome};
pub use grid::{Cell, CellCounts, CellSet, Grid, Move, Position, MOVES};
pub use hazard::HazardModel;
pub use jidoka::{JidokaGuard, JidokaViolation};
pub use rng::SimRng;
