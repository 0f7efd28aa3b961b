//! Diagnostic tracing for the `firebreak` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is
//! left to the binary. Run output (grids, reports) never goes through here.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Falls back to `default_level` (`warn` in normal runs,
/// `debug` with `-v`). Output: stderr, compact format.
///
/// Calling it twice is harmless; the second subscriber is dropped.
///
/// # Example
/// ```bash
/// RUST_LOG=firebreak=trace firebreak run input.dat
/// ```
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

/// Default filter for the given verbosity flag.
#[must_use]
pub const fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}
