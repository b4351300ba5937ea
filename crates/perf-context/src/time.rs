// Path: crates/perf-context/src/time.rs
//! Scoped step timers.
//!
//! A [`PerfStepTimer`] brackets a region of a hot path and adds the time spent
//! inside it to one [`Accumulator`]. Whether the timer runs is decided once,
//! at construction, from the perf level; a disabled timer never reads the
//! clock and never writes its slot.
//!
//! ```
//! use perf_context::{set_perf_level, Metric, PerfLevel, PerfStepTimer};
//!
//! static BLOCK_READ_TIME: Metric = Metric::new("block_read_time");
//! static BLOCK_CHECKSUM_TIME: Metric = Metric::new("block_checksum_time");
//!
//! set_perf_level(PerfLevel::EnableTime);
//! let mut read = PerfStepTimer::new(&BLOCK_READ_TIME);
//! read.start();
//! // ... read the block ...
//! read.stop();
//!
//! let _checksum = perf_context::perf_timer_guard(&BLOCK_CHECKSUM_TIME);
//! // ... verify, flushed when `_checksum` goes out of scope ...
//! ```

use crate::clock::{Clock, MonotonicClock};
use crate::context::Accumulator;
use crate::level::{LevelSource, ThreadLocalLevel};
use std::marker::PhantomData;

/// The start/measure/stop contract shared by the real and the null timer.
///
/// Generic instrumentation helpers take `impl StepTimer` so they work the
/// same whether timing is compiled in or not.
pub trait StepTimer {
    /// Opens an interval, or restarts the open one.
    fn start(&mut self);
    /// Flushes the time since the last mark and keeps the interval open.
    fn measure(&mut self);
    /// Flushes the time since the last mark and closes the interval.
    fn stop(&mut self);
}

/// A timer bound to one accumulator slot for the lifetime of a scope.
///
/// Dropping the timer stops it, so an open interval is flushed exactly once
/// on every exit path: fall-through, early `return`, `?`, or unwinding.
///
/// A timer is pinned to the thread that created it. [`crate::Metric`] slots
/// resolve to the current thread's context when they are written, so a timer
/// dropped on another thread would credit that thread instead.
///
/// ```compile_fail
/// use perf_context::{Metric, PerfStepTimer};
///
/// fn assert_send<T: Send>() {}
/// assert_send::<PerfStepTimer<'static, Metric>>();
/// ```
///
/// ```compile_fail
/// use perf_context::{Metric, PerfStepTimer};
///
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<PerfStepTimer<'static, Metric>>();
/// ```
#[must_use = "PerfStepTimer must be bound to a variable to time the enclosing scope"]
pub struct PerfStepTimer<'a, A, C = MonotonicClock>
where
    A: Accumulator + ?Sized,
    C: Clock + ?Sized,
{
    enabled: bool,
    clock: Option<&'a C>,
    start: Option<u64>,
    metric: &'a A,
    _thread: PhantomData<*const ()>,
}

impl<'a, A> PerfStepTimer<'a, A>
where
    A: Accumulator + ?Sized,
{
    /// Creates an idle timer on `metric`, latching the calling thread's level.
    #[inline]
    pub fn new(metric: &'a A) -> Self {
        let enabled = ThreadLocalLevel.current_level().is_timing_enabled();
        Self {
            enabled,
            clock: if enabled {
                Some(MonotonicClock::global())
            } else {
                None
            },
            start: None,
            metric,
            _thread: PhantomData,
        }
    }

    /// Creates a timer on `metric` and starts it.
    #[inline]
    pub fn started(metric: &'a A) -> Self {
        let mut timer = Self::new(metric);
        timer.start();
        timer
    }
}

impl<'a, A, C> PerfStepTimer<'a, A, C>
where
    A: Accumulator + ?Sized,
    C: Clock + ?Sized,
{
    /// Creates an idle timer with an explicit level source and clock.
    ///
    /// The level is read once, here. `clock` is only retained when timing is
    /// enabled.
    pub fn with_sources<L>(metric: &'a A, levels: &L, clock: &'a C) -> Self
    where
        L: LevelSource + ?Sized,
    {
        let enabled = levels.current_level().is_timing_enabled();
        Self {
            enabled,
            clock: if enabled { Some(clock) } else { None },
            start: None,
            metric,
            _thread: PhantomData,
        }
    }

    /// Whether this timer latched an enabled level.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether an interval is open.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    /// Opens an interval at the current clock reading.
    ///
    /// On a running timer this moves the mark to now and discards the time
    /// since the previous mark without flushing it.
    #[inline]
    pub fn start(&mut self) {
        if self.enabled {
            self.start = self.clock.map(Clock::now_nanos);
        }
    }

    /// Adds the time since the last mark to the slot and moves the mark to
    /// now. The interval stays open.
    #[inline]
    pub fn measure(&mut self) {
        if let (Some(start), Some(clock)) = (self.start, self.clock) {
            let now = clock.now_nanos();
            self.metric.add(now.saturating_sub(start));
            self.start = Some(now);
        }
    }

    /// Adds the time since the last mark to the slot and closes the interval.
    /// A second `stop` without a `start` in between does nothing.
    #[inline]
    pub fn stop(&mut self) {
        if let (Some(start), Some(clock)) = (self.start.take(), self.clock) {
            self.metric.add(clock.now_nanos().saturating_sub(start));
        }
    }
}

impl<A, C> StepTimer for PerfStepTimer<'_, A, C>
where
    A: Accumulator + ?Sized,
    C: Clock + ?Sized,
{
    #[inline]
    fn start(&mut self) {
        Self::start(self);
    }

    #[inline]
    fn measure(&mut self) {
        Self::measure(self);
    }

    #[inline]
    fn stop(&mut self) {
        Self::stop(self);
    }
}

impl<A, C> Drop for PerfStepTimer<'_, A, C>
where
    A: Accumulator + ?Sized,
    C: Clock + ?Sized,
{
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::level::{set_perf_level, PerfLevel, PerfLevelScope};
    use std::cell::Cell;

    fn enabled_timer<'a>(
        slot: &'a Cell<u64>,
        clock: &'a ManualClock,
    ) -> PerfStepTimer<'a, Cell<u64>, ManualClock> {
        PerfStepTimer::with_sources(slot, &PerfLevel::EnableTime, clock)
    }

    #[test]
    fn test_disabled_timer_never_reads_clock() {
        let slot = Cell::new(0);
        let clock = ManualClock::new(10);
        for level in [PerfLevel::Disable, PerfLevel::EnableCount] {
            let mut timer = PerfStepTimer::with_sources(&slot, &level, &clock);
            assert!(!timer.is_enabled());
            timer.start();
            clock.advance(100);
            timer.measure();
            assert!(!timer.is_running());
            timer.stop();
            timer.start();
        }
        assert_eq!(clock.reads(), 0);
        assert_eq!(slot.get(), 0);
    }

    #[test]
    fn test_single_interval() {
        let slot = Cell::new(0);
        let clock = ManualClock::new(1_000);
        let mut timer = enabled_timer(&slot, &clock);
        timer.start();
        assert!(timer.is_running());
        clock.advance(250);
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(slot.get(), 250);
        assert_eq!(clock.reads(), 2);
    }

    #[test]
    fn test_measure_partitions_interval() {
        let slot = Cell::new(0);
        let clock = ManualClock::new(0);
        let mut timer = enabled_timer(&slot, &clock);
        timer.start();
        clock.advance(10);
        timer.measure();
        assert_eq!(slot.get(), 10);
        clock.advance(20);
        timer.measure();
        assert_eq!(slot.get(), 30);
        assert!(timer.is_running());
        clock.advance(5);
        timer.stop();
        assert_eq!(slot.get(), 35);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let slot = Cell::new(0);
        let clock = ManualClock::new(0);
        let mut timer = enabled_timer(&slot, &clock);
        timer.start();
        clock.advance(7);
        timer.stop();
        clock.advance(1_000);
        timer.stop();
        timer.measure();
        assert_eq!(slot.get(), 7);
        assert_eq!(clock.reads(), 2);
    }

    #[test]
    fn test_drop_flushes_open_interval_once() {
        let slot = Cell::new(0);
        let clock = ManualClock::new(0);
        {
            let mut timer = enabled_timer(&slot, &clock);
            timer.start();
            clock.advance(42);
        }
        assert_eq!(slot.get(), 42);

        {
            let mut timer = enabled_timer(&slot, &clock);
            timer.start();
            clock.advance(8);
            timer.stop();
            clock.advance(100);
        }
        assert_eq!(slot.get(), 50);
    }

    #[test]
    fn test_start_while_running_restarts_without_flushing() {
        let slot = Cell::new(0);
        let clock = ManualClock::new(0);
        let mut timer = enabled_timer(&slot, &clock);
        timer.start();
        clock.advance(30);
        timer.start();
        assert_eq!(slot.get(), 0);
        clock.advance(4);
        timer.stop();
        assert_eq!(slot.get(), 4);
    }

    #[test]
    fn test_backward_clock_saturates() {
        let slot = Cell::new(0);
        let clock = ManualClock::new(500);
        let mut timer = enabled_timer(&slot, &clock);
        timer.start();
        clock.set(100);
        timer.stop();
        assert_eq!(slot.get(), 0);
    }

    #[test]
    fn test_level_is_latched_at_construction() {
        let slot = Cell::new(0);
        set_perf_level(PerfLevel::Disable);
        let mut late = PerfStepTimer::new(&slot);
        set_perf_level(PerfLevel::EnableTime);
        late.start();
        assert!(!late.is_enabled());
        assert!(!late.is_running());

        let mut early = PerfStepTimer::new(&slot);
        set_perf_level(PerfLevel::Disable);
        early.start();
        assert!(early.is_running());
        early.stop();
        assert!(!early.is_running());
    }

    #[test]
    fn test_started_uses_monotonic_clock() {
        let _level = PerfLevelScope::new(PerfLevel::EnableTime);
        let slot = Cell::new(0);
        {
            let timer = PerfStepTimer::started(&slot);
            assert!(timer.is_running());
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        assert!(slot.get() >= 1_000_000);
    }

    #[test]
    fn test_works_through_dyn_accumulator() {
        let slot = Cell::new(0);
        let dyn_slot: &dyn Accumulator = &slot;
        let clock = ManualClock::new(0);
        let mut timer = PerfStepTimer::with_sources(dyn_slot, &PerfLevel::EnableTime, &clock);
        StepTimer::start(&mut timer);
        clock.advance(3);
        StepTimer::stop(&mut timer);
        assert_eq!(slot.get(), 3);
    }
}
