// Path: crates/perf-context/src/error.rs
//! Errors raised at the configuration edge.
//!
//! Timer, level and accumulator operations never fail; only turning outside
//! input (strings, environment variables) into a [`crate::PerfLevel`] or a
//! [`crate::PerfConfig`] can.

use thiserror::Error;

/// Errors related to perf configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerfError {
    /// The string does not name a known perf level.
    #[error("Unknown perf level: {0}")]
    UnknownLevel(String),
    /// An environment variable was set but could not be read as unicode.
    #[error("Environment variable {0} is not valid unicode")]
    InvalidEnv(&'static str),
}

impl PerfError {
    /// Returns the stable, machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownLevel(_) => "PERF_UNKNOWN_LEVEL",
            Self::InvalidEnv(_) => "PERF_INVALID_ENV",
        }
    }
}
