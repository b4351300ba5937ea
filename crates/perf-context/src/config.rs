// Path: crates/perf-context/src/config.rs
//! Operator-facing perf settings.

use crate::error::PerfError;
use crate::level::{set_perf_level, PerfLevel};
use serde::{Deserialize, Serialize};
use std::env::{self, VarError};

/// Environment variable overriding [`PerfConfig::level`].
pub const PERF_LEVEL_ENV: &str = "PERF_LEVEL";
/// Environment variable overriding [`PerfConfig::log_filter`].
pub const PERF_LOG_ENV: &str = "PERF_LOG";

/// Perf and logging configuration, usually embedded in a larger config file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PerfConfig {
    /// Level applied to threads that call [`PerfConfig::apply`].
    pub level: PerfLevel,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Emit JSON log lines instead of plain text.
    pub log_json: bool,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            level: PerfLevel::Disable,
            log_filter: "info".to_string(),
            log_json: true,
        }
    }
}

impl PerfConfig {
    /// The defaults with `PERF_LEVEL` / `PERF_LOG` applied on top.
    pub fn from_env() -> Result<Self, PerfError> {
        Self::default().with_env_overrides()
    }

    /// Applies `PERF_LEVEL` / `PERF_LOG` on top of `self`.
    pub fn with_env_overrides(mut self) -> Result<Self, PerfError> {
        if let Some(level) = read_env(PERF_LEVEL_ENV)? {
            self.level = level.parse()?;
        }
        if let Some(filter) = read_env(PERF_LOG_ENV)? {
            self.log_filter = filter;
        }
        Ok(self)
    }

    /// Sets the calling thread's perf level from this config.
    ///
    /// The level is thread-local; worker threads apply it themselves.
    pub fn apply(&self) {
        set_perf_level(self.level);
    }
}

fn read_env(key: &'static str) -> Result<Option<String>, PerfError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(PerfError::InvalidEnv(key)),
    }
}
