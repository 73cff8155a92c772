// Raw flush input: counters, timers, gauges for one flush interval.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One flush's metrics as handed over by the collector host.
/// This is also the on-disk shape of a raw snapshot file; the timestamp
/// lives in the filename, not in the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPayload {
    #[serde(default)]
    pub counters: BTreeMap<String, f64>,
    #[serde(default)]
    pub timers: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub gauges: BTreeMap<String, f64>,
}

/// A persisted snapshot: immutable once written; the millisecond timestamp
/// is its sole identity and sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub timestamp: u64,
    pub metrics: MetricsPayload,
}
