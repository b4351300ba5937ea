// Path: crates/perf-context/src/null.rs
//! The compiled-out timer.
//!
//! When the `perf-context` feature is off, [`crate::ScopedTimer`] resolves to
//! [`NullStepTimer`]: zero-sized, no state, every method an empty inline body.

use crate::context::Accumulator;
use crate::time::StepTimer;
use std::marker::PhantomData;

/// A zero-sized stand-in for [`crate::PerfStepTimer`] with the same surface,
/// including being pinned to its thread.
///
/// ```compile_fail
/// use perf_context::{Metric, NullStepTimer};
///
/// fn assert_send<T: Send>() {}
/// assert_send::<NullStepTimer<'static, Metric>>();
/// ```
#[must_use = "NullStepTimer mirrors PerfStepTimer and should be bound the same way"]
pub struct NullStepTimer<'a, A: Accumulator + ?Sized> {
    _metric: PhantomData<(&'a A, *const ())>,
}

impl<'a, A: Accumulator + ?Sized> NullStepTimer<'a, A> {
    #[inline(always)]
    pub fn new(_metric: &'a A) -> Self {
        Self {
            _metric: PhantomData,
        }
    }

    #[inline(always)]
    pub fn started(metric: &'a A) -> Self {
        Self::new(metric)
    }

    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        false
    }

    #[inline(always)]
    pub fn is_running(&self) -> bool {
        false
    }

    #[inline(always)]
    pub fn start(&mut self) {}

    #[inline(always)]
    pub fn measure(&mut self) {}

    #[inline(always)]
    pub fn stop(&mut self) {}
}

impl<A: Accumulator + ?Sized> StepTimer for NullStepTimer<'_, A> {
    #[inline(always)]
    fn start(&mut self) {}

    #[inline(always)]
    fn measure(&mut self) {}

    #[inline(always)]
    fn stop(&mut self) {}
}
