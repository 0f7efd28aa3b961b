//! Error types for firebreak.
//!
//! The simulation core itself never fails: illegal moves and exhausted
//! search budgets degrade to safe defaults. Errors only arise at the edges
//! (input parsing, configuration, file I/O) and from the optional Jidoka
//! invariant guard.

use thiserror::Error;

/// Result type alias for firebreak operations.
pub type FireResult<T> = Result<T, FireError>;

/// Unified error type for all firebreak operations.
#[derive(Debug, Error)]
pub enum FireError {
    // ===== Input Errors =====
    /// Malformed scenario input (counts, coordinates, symbols, shape).
    #[error("Input format error: {message}")]
    InputFormat {
        /// Description of what was wrong with the input.
        message: String,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ===== Jidoka Violations =====
    /// A grid invariant was broken between two ticks.
    #[error("Jidoka: invariant violated at tick {tick}: {message}")]
    InvariantViolation {
        /// Tick at which the violation was detected.
        tick: u64,
        /// What was violated.
        message: String,
    },
}

impl FireError {
    /// Create an input-format error with a message.
    #[must_use]
    pub fn input(message: impl Into<String>) -> Self {
        Self::InputFormat {
            message: message.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this error belongs to the input-format category.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InputFormat { .. })
    }

    /// Check if this error is a Jidoka violation (requires immediate stop).
    #[must_use]
    pub const fn is_jidoka_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }
}

impl From<serde_json::Error> for FireError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
