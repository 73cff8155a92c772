// Shared test helpers

use statsink::models::{MetricsPayload, MetricsSnapshot};

pub fn payload(
    counters: &[(&str, f64)],
    timers: &[(&str, &[f64])],
    gauges: &[(&str, f64)],
) -> MetricsPayload {
    MetricsPayload {
        counters: counters.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        timers: timers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect(),
        gauges: gauges.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
    }
}

pub fn snapshot(timestamp: u64, metrics: MetricsPayload) -> MetricsSnapshot {
    MetricsSnapshot { timestamp, metrics }
}

pub fn counters_only(entries: &[(&str, f64)]) -> MetricsPayload {
    payload(entries, &[], &[])
}
