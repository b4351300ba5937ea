// Path: crates/perf-context/src/level.rs
//! The per-thread enable level that gates step timers.

use crate::error::PerfError;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

/// How much perf data the current thread collects.
///
/// Levels are ordered; timers run only at [`PerfLevel::EnableTime`] or above.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PerfLevel {
    /// No timing at all. Timers never read the clock.
    #[default]
    Disable,
    /// Counters only.
    EnableCount,
    /// Counters and step timers.
    EnableTime,
}

impl PerfLevel {
    /// The lowest level at which step timers read the clock.
    pub const TIMING_THRESHOLD: PerfLevel = PerfLevel::EnableTime;

    /// Whether a timer constructed at this level is enabled.
    #[inline]
    pub fn is_timing_enabled(self) -> bool {
        self >= Self::TIMING_THRESHOLD
    }

    /// The canonical lowercase name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disable => "disable",
            Self::EnableCount => "enable_count",
            Self::EnableTime => "enable_time",
        }
    }
}

impl fmt::Display for PerfLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerfLevel {
    type Err = PerfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "disable" => Ok(Self::Disable),
            "1" | "enable_count" => Ok(Self::EnableCount),
            "2" | "enable_time" => Ok(Self::EnableTime),
            other => Err(PerfError::UnknownLevel(other.to_string())),
        }
    }
}

thread_local! {
    static PERF_LEVEL: Cell<PerfLevel> = const { Cell::new(PerfLevel::Disable) };
}

/// Returns the calling thread's perf level.
#[inline]
pub fn perf_level() -> PerfLevel {
    PERF_LEVEL
        .try_with(Cell::get)
        .unwrap_or(PerfLevel::Disable)
}

/// Sets the calling thread's perf level.
///
/// Timers already constructed keep the level they latched.
pub fn set_perf_level(level: PerfLevel) {
    let previous = PERF_LEVEL.try_with(|cell| cell.replace(level));
    if let Ok(previous) = previous {
        if previous != level {
            tracing::debug!(target: "perf", from = %previous, to = %level, "perf level changed");
        }
    }
}

/// Anything a timer can ask for the current level at construction time.
pub trait LevelSource {
    /// The level to latch.
    fn current_level(&self) -> PerfLevel;
}

/// Reads the calling thread's level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLocalLevel;

impl LevelSource for ThreadLocalLevel {
    #[inline]
    fn current_level(&self) -> PerfLevel {
        perf_level()
    }
}

// A bare level is a fixed source, handy where no thread state should leak in.
impl LevelSource for PerfLevel {
    #[inline]
    fn current_level(&self) -> PerfLevel {
        *self
    }
}

/// An RAII guard that sets the thread's perf level and restores the previous
/// one on drop.
#[must_use = "PerfLevelScope must be bound to a variable to hold the level for the scope"]
#[derive(Debug)]
pub struct PerfLevelScope {
    previous: PerfLevel,
}

impl PerfLevelScope {
    /// Switches the calling thread to `level` until the scope is dropped.
    pub fn new(level: PerfLevel) -> Self {
        let previous = perf_level();
        set_perf_level(level);
        Self { previous }
    }

    /// The level that will be restored.
    pub fn previous(&self) -> PerfLevel {
        self.previous
    }
}

impl Drop for PerfLevelScope {
    fn drop(&mut self) {
        set_perf_level(self.previous);
    }
}
