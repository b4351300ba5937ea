// Path: crates/perf-context/tests/prometheus_export.rs
#![cfg(feature = "perf-context")]

use perf_context::prometheus::{install, install_global};
use perf_context::{
    export_perf_context, perf_sink, perf_timer_guard, Metric, PerfLevel, PerfLevelScope,
};
use std::time::Duration;

// Own test binary: the installed sink and the default registry are process-global.

static COMPACTION_MERGE_TIME: Metric = Metric::new("compaction_merge_time");
static COMPACTION_KEYS_DROPPED: Metric = Metric::new("compaction_keys_dropped");

fn gathered(metric: &str) -> u64 {
    prometheus::gather()
        .iter()
        .filter(|family| family.get_name() == "perf_context_total")
        .flat_map(|family| family.get_metric())
        .filter(|m| m.get_label().iter().any(|l| l.get_value() == metric))
        .map(|m| m.get_counter().get_value() as u64)
        .sum()
}

#[test]
fn test_global_install_routes_exports_to_prometheus() {
    assert!(install_global().unwrap());
    assert!(install_global().unwrap());
    assert!(std::ptr::addr_eq(perf_sink(), install().unwrap()));
    assert_eq!(format!("{:?}", perf_sink()), "PrometheusSink");

    {
        let _level = PerfLevelScope::new(PerfLevel::EnableTime);
        let _merge = perf_timer_guard(&COMPACTION_MERGE_TIME);
        perf_context::perf_counter_add(&COMPACTION_KEYS_DROPPED, 3);
        std::thread::sleep(Duration::from_millis(1));
    }

    let drained = export_perf_context();
    let merge_nanos = drained.get("compaction_merge_time");
    assert!(merge_nanos >= 1_000_000);
    assert_eq!(gathered("compaction_merge_time"), merge_nanos);
    assert_eq!(gathered("compaction_keys_dropped"), 3);
    assert_eq!(COMPACTION_MERGE_TIME.get(), 0);

    perf_context::perf_counter_add(&COMPACTION_KEYS_DROPPED, 2);
    export_perf_context();
    assert_eq!(gathered("compaction_keys_dropped"), 5);
}
