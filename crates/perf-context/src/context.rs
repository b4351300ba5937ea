// Path: crates/perf-context/src/context.rs
//! Per-thread named perf counters.
//!
//! Every thread owns one [`PerfContext`]. Hot paths address its counters
//! through `static` [`Metric`] handles, so two threads bumping the same
//! metric never share memory and no counter write takes a lock.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A 64-bit slot that durations and tallies are added into.
///
/// Adds wrap on overflow and never fail.
pub trait Accumulator {
    /// Adds `delta` to the slot.
    fn add(&self, delta: u64);
}

impl Accumulator for Cell<u64> {
    #[inline]
    fn add(&self, delta: u64) {
        self.set(self.get().wrapping_add(delta));
    }
}

impl Accumulator for AtomicU64 {
    #[inline]
    fn add(&self, delta: u64) {
        self.fetch_add(delta, Ordering::Relaxed);
    }
}

/// A thread's named counters.
#[derive(Debug, Default)]
pub struct PerfContext {
    counters: RefCell<AHashMap<&'static str, u64>>,
}

impl PerfContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the counter called `name`, creating it at zero.
    #[inline]
    pub fn add(&self, name: &'static str, delta: u64) {
        // A borrow can only be outstanding if a caller re-enters from inside
        // `with_perf_context`; the sample is dropped rather than panicking.
        if let Ok(mut counters) = self.counters.try_borrow_mut() {
            let slot = counters.entry(name).or_insert(0);
            *slot = slot.wrapping_add(delta);
        }
    }

    /// Current value of `name`, zero if it was never touched.
    pub fn get(&self, name: &str) -> u64 {
        self.counters
            .try_borrow()
            .ok()
            .and_then(|counters| counters.get(name).copied())
            .unwrap_or(0)
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        if let Ok(mut counters) = self.counters.try_borrow_mut() {
            counters.clear();
        }
    }

    /// An ordered copy of all counters.
    pub fn snapshot(&self) -> PerfSnapshot {
        let counters = self
            .counters
            .try_borrow()
            .map(|counters| {
                counters
                    .iter()
                    .map(|(name, value)| (name.to_string(), *value))
                    .collect()
            })
            .unwrap_or_default();
        PerfSnapshot { counters }
    }

    /// Takes a snapshot and resets in one step.
    pub fn take(&self) -> PerfSnapshot {
        let snapshot = self.snapshot();
        self.reset();
        snapshot
    }
}

thread_local! {
    static PERF_CONTEXT: PerfContext = PerfContext::new();
}

/// Runs `f` against the calling thread's context.
///
/// Returns `None` only while the thread is being torn down.
pub fn with_perf_context<R>(f: impl FnOnce(&PerfContext) -> R) -> Option<R> {
    PERF_CONTEXT.try_with(f).ok()
}

/// A named counter in the calling thread's [`PerfContext`].
///
/// Declare one `static` per metric and hand `&METRIC` to timers:
///
/// ```
/// use perf_context::{perf_timer_guard, Metric};
///
/// static GET_FROM_MEMTABLE_TIME: Metric = Metric::new("get_from_memtable_time");
///
/// fn lookup() {
///     let _timer = perf_timer_guard(&GET_FROM_MEMTABLE_TIME);
///     // ... look in the memtable ...
/// }
/// # lookup();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Metric {
    name: &'static str,
}

impl Metric {
    /// Names a counter.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// The counter's name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The calling thread's value for this counter.
    pub fn get(&self) -> u64 {
        with_perf_context(|ctx| ctx.get(self.name)).unwrap_or(0)
    }
}

impl Accumulator for Metric {
    #[inline]
    fn add(&self, delta: u64) {
        let _ = PERF_CONTEXT.try_with(|ctx| ctx.add(self.name, delta));
    }
}

/// An ordered copy of a thread's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerfSnapshot {
    counters: BTreeMap<String, u64>,
}

impl PerfSnapshot {
    /// Value of `name`, zero if absent.
    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Counters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counters.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of counters, including zero-valued ones.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether no counter was touched.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Sum of every counter.
    pub fn total(&self) -> u64 {
        self.counters
            .values()
            .fold(0u64, |acc, value| acc.wrapping_add(*value))
    }
}

impl fmt::Display for PerfSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}
