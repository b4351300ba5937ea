// Path: crates/perf-context/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Perf Context
//!
//! Opt-in timing instrumentation for storage hot paths. Call sites bracket a
//! phase with a step timer bound to a named per-thread counter; when the
//! thread's [`PerfLevel`] is below [`PerfLevel::EnableTime`] the timer costs
//! one boolean check per call and never touches the clock.
//!
//! Building without the default `perf-context` feature swaps [`ScopedTimer`]
//! for the zero-sized [`NullStepTimer`] and turns [`perf_counter_add`] into
//! nothing, without changing any call site.

/// Nanosecond time sources, including a hand-driven clock for tests.
pub mod clock;
/// Operator-facing configuration for levels and logging.
pub mod config;
/// Per-thread named counters and the `Accumulator` slot trait.
pub mod context;
/// Errors raised while parsing configuration.
pub mod error;
/// The initialization routine for global structured logging.
pub mod init;
/// The thread-local perf level and the sources timers read it from.
pub mod level;
/// The zero-sized timer used when instrumentation is compiled out.
pub mod null;
/// A Prometheus implementation of the perf sink.
pub mod prometheus;
/// Process-wide destinations for drained per-thread counters.
pub mod sinks;
/// Scoped step timers.
pub mod time;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::PerfConfig;
pub use context::{with_perf_context, Accumulator, Metric, PerfContext, PerfSnapshot};
pub use error::PerfError;
pub use level::{
    perf_level, set_perf_level, LevelSource, PerfLevel, PerfLevelScope, ThreadLocalLevel,
};
pub use null::NullStepTimer;
pub use sinks::{export_perf_context, perf_sink, PerfContextSink};
pub use time::{PerfStepTimer, StepTimer};

/// The timer call sites get from [`perf_timer_guard`].
#[cfg(feature = "perf-context")]
pub type ScopedTimer<'a, A> = PerfStepTimer<'a, A>;
/// The timer call sites get from [`perf_timer_guard`].
#[cfg(not(feature = "perf-context"))]
pub type ScopedTimer<'a, A> = NullStepTimer<'a, A>;

/// Declares a timer on `metric` and starts it; the rest of the enclosing
/// scope is timed.
///
/// ```
/// use perf_context::{perf_timer_guard, Metric};
///
/// static GET_POST_PROCESS_TIME: Metric = Metric::new("get_post_process_time");
///
/// fn post_process(value: &[u8]) -> Option<usize> {
///     let mut timer = perf_timer_guard(&GET_POST_PROCESS_TIME);
///     if value.is_empty() {
///         return None;
///     }
///     timer.measure();
///     Some(value.len())
/// }
/// # post_process(b"v");
/// ```
#[inline]
pub fn perf_timer_guard<A: Accumulator + ?Sized>(metric: &A) -> ScopedTimer<'_, A> {
    ScopedTimer::started(metric)
}

/// Adds `value` to `metric` regardless of the perf level.
#[inline]
pub fn perf_counter_add<A: Accumulator + ?Sized>(metric: &A, value: u64) {
    #[cfg(feature = "perf-context")]
    metric.add(value);
    #[cfg(not(feature = "perf-context"))]
    let _ = (metric, value);
}

#[cfg(all(test, not(feature = "perf-context")))]
mod compiled_out_tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_scoped_timer_is_the_null_timer() {
        let _level = PerfLevelScope::new(PerfLevel::EnableTime);
        let slot = Cell::new(0);
        assert_eq!(std::mem::size_of::<ScopedTimer<'_, Cell<u64>>>(), 0);
        {
            let mut timer: NullStepTimer<'_, Cell<u64>> = perf_timer_guard(&slot);
            assert!(!timer.is_enabled());
            std::thread::sleep(std::time::Duration::from_millis(1));
            timer.measure();
        }
        assert_eq!(slot.get(), 0);
    }

    #[test]
    fn test_counter_add_is_removed() {
        static BLOCK_CACHE_HIT_COUNT: Metric = Metric::new("block_cache_hit_count");
        let slot = Cell::new(5);
        perf_counter_add(&slot, 10);
        perf_counter_add(&BLOCK_CACHE_HIT_COUNT, 1);
        assert_eq!(slot.get(), 5);
        assert_eq!(BLOCK_CACHE_HIT_COUNT.get(), 0);
    }
}
