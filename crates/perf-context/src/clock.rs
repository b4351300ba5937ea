// Path: crates/perf-context/src/clock.rs
//! Nanosecond time sources for step timers.

use once_cell::sync::Lazy;
use std::cell::Cell;
use std::time::Instant;

/// A monotonic nanosecond time source.
///
/// Readings must never go backward within a thread. Step timers only ever
/// subtract two readings taken from the same clock.
pub trait Clock {
    /// Returns the current reading in nanoseconds.
    fn now_nanos(&self) -> u64;
}

// Anchored on first use so readings start near zero and fit in a u64 for
// roughly five centuries of uptime.
static ANCHOR: Lazy<Instant> = Lazy::new(Instant::now);
static MONOTONIC: MonotonicClock = MonotonicClock;

/// The process-wide monotonic clock backed by [`Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    /// Returns the shared clock, anchoring it on first call.
    #[inline]
    pub fn global() -> &'static MonotonicClock {
        Lazy::force(&ANCHOR);
        &MONOTONIC
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_nanos(&self) -> u64 {
        u64::try_from(ANCHOR.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// A hand-driven clock for deterministic tests.
///
/// Every call to [`Clock::now_nanos`] is counted, so tests can assert that a
/// disabled timer never touched its clock.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
    reads: Cell<u64>,
}

impl ManualClock {
    /// Creates a clock reading `start` nanoseconds.
    pub fn new(start: u64) -> Self {
        Self {
            now: Cell::new(start),
            reads: Cell::new(0),
        }
    }

    /// Moves the clock forward by `nanos`.
    pub fn advance(&self, nanos: u64) {
        self.now.set(self.now.get().saturating_add(nanos));
    }

    /// Sets the absolute reading. Callers are responsible for keeping it
    /// monotonic if they want meaningful durations.
    pub fn set(&self, nanos: u64) {
        self.now.set(nanos);
    }

    /// Number of times the clock has been read.
    pub fn reads(&self) -> u64 {
        self.reads.get()
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> u64 {
        self.reads.set(self.reads.get() + 1);
        self.now.get()
    }
}
