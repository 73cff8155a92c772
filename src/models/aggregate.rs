// Aggregate record: one full reduction over all retained snapshots.
// Rebuilt from scratch every pass, never merged with the previous record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reduced view of the retained snapshot set. Counters are sums, timers keep
/// every sample plus derived stats, gauges keep every observed value in
/// snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    pub counters: BTreeMap<String, f64>,
    pub timers: BTreeMap<String, TimerAggregate>,
    pub gauges: BTreeMap<String, Vec<f64>>,
}

/// All samples for one timer name, concatenated in ascending-snapshot order.
/// `stats` is present only when at least one sample was observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerAggregate {
    pub samples: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<TimerStats>,
}

/// Derived timer statistics, recomputed from the full sample list each pass.
/// `stdev` is the population standard deviation (divide by count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stdev: f64,
}
