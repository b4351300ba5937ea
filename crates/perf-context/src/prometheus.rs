// Path: crates/perf-context/src/prometheus.rs
//! A Prometheus-backed [`PerfContextSink`].

use crate::sinks::{PerfContextSink, SINK};
use once_cell::sync::OnceCell;
use prometheus::{register_int_counter_vec, IntCounterVec};

// Registered once by `install`, against the default registry.
static PERF_CONTEXT_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

/// Aggregates drained counters into `perf_context_total{metric}`.
#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

impl PerfContextSink for PrometheusSink {
    fn record_counter(&self, name: &str, value: u64) {
        // Before `install` there is nowhere to record to.
        if let Some(counter) = PERF_CONTEXT_TOTAL.get() {
            counter.with_label_values(&[name]).inc_by(value);
        }
    }
}

/// Registers the collector and returns the sink. Safe to call more than once;
/// later calls return the same sink without re-registering.
pub fn install() -> Result<&'static dyn PerfContextSink, prometheus::Error> {
    PERF_CONTEXT_TOTAL.get_or_try_init(|| {
        let counter = register_int_counter_vec!(
            "perf_context_total",
            "Perf counters drained from per-thread contexts (nanoseconds for timers).",
            &["metric"]
        )?;
        tracing::info!(target: "perf", "registered perf_context_total collector");
        Ok::<_, prometheus::Error>(counter)
    })?;

    static PROMETHEUS_SINK: PrometheusSink = PrometheusSink;
    Ok(&PROMETHEUS_SINK)
}

/// Installs the Prometheus sink as the process-wide [`SINK`].
///
/// Returns `true` once the Prometheus sink is the installed one, including on
/// repeated calls, and `false` if a different sink was installed first.
pub fn install_global() -> Result<bool, prometheus::Error> {
    let sink = install()?;
    let installed = *SINK.get_or_init(|| sink);
    let ours = std::ptr::addr_eq(installed, sink);
    if !ours {
        tracing::warn!(target: "perf", ?installed, "another perf sink is already installed");
    }
    Ok(ours)
}
