// Path: crates/perf-context/src/sinks.rs
//! Process-wide destinations for per-thread perf counters.
//!
//! Counters live in thread-local [`PerfContext`](crate::PerfContext)s. A
//! thread that wants its numbers aggregated drains them into a sink with
//! [`export_perf_context`]; the sink decides what aggregation means.

use crate::context::{with_perf_context, PerfContext, PerfSnapshot};
use once_cell::sync::OnceCell;

/// A sink for drained perf counters.
pub trait PerfContextSink: Send + Sync + std::fmt::Debug {
    /// Adds `value` to the aggregate for counter `name`.
    fn record_counter(&self, name: &str, value: u64);
}

/// A no-op sink for use in tests or when no exporter is installed.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

impl PerfContextSink for NopSink {
    fn record_counter(&self, _name: &str, _value: u64) {}
}

/// The installed process-wide sink.
pub static SINK: OnceCell<&'static dyn PerfContextSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns the installed sink, or a no-op sink if none has been set.
pub fn perf_sink() -> &'static dyn PerfContextSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Drains the calling thread's context into the installed sink.
pub fn export_perf_context() -> PerfSnapshot {
    export_perf_context_to(perf_sink())
}

/// Drains the calling thread's context into `sink` and resets it.
///
/// Zero-valued counters are skipped. Returns what was drained.
pub fn export_perf_context_to(sink: &dyn PerfContextSink) -> PerfSnapshot {
    let snapshot = with_perf_context(PerfContext::take).unwrap_or_default();
    for (name, value) in snapshot.iter().filter(|(_, value)| *value > 0) {
        sink.record_counter(name, value);
    }
    tracing::debug!(
        target: "perf",
        counters = snapshot.len(),
        total = snapshot.total(),
        "exported perf context"
    );
    snapshot
}
