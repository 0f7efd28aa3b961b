//! Text I/O around the engine: scenario loading, grid and report output.

pub mod loader;
pub mod writer;

pub use loader::{load_input, parse_input, Scenario};
pub use writer::{render_grid, write_grid, RunReport};
