// Cross-snapshot reduction: sum counters, concatenate timer samples and
// derive stats, append gauge values. Storage stays in snapshot_repo::mod.

use std::collections::BTreeMap;

use crate::models::{AggregateRecord, MetricsSnapshot, TimerAggregate, TimerStats};

/// Reduces the retained snapshot set into one AggregateRecord.
///
/// Snapshots are iterated in ascending-timestamp order so that timer and
/// gauge sequences are deterministic regardless of store enumeration order.
/// Counter sums are order-independent. The record is rebuilt from the full
/// input every call; nothing is carried over from a previous pass.
pub fn reduce(snapshots: &[MetricsSnapshot]) -> AggregateRecord {
    let mut ordered: Vec<&MetricsSnapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.timestamp);

    let mut counters: BTreeMap<String, f64> = BTreeMap::new();
    let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut gauges: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for snapshot in &ordered {
        for (name, value) in &snapshot.metrics.counters {
            *counters.entry(name.clone()).or_insert(0.0) += value;
        }
        for (name, list) in &snapshot.metrics.timers {
            samples
                .entry(name.clone())
                .or_default()
                .extend_from_slice(list);
        }
        for (name, value) in &snapshot.metrics.gauges {
            gauges.entry(name.clone()).or_default().push(*value);
        }
    }

    let timers = samples
        .into_iter()
        .map(|(name, samples)| {
            let stats = timer_stats(&samples);
            (name, TimerAggregate { samples, stats })
        })
        .collect();

    AggregateRecord {
        counters,
        timers,
        gauges,
    }
}

/// Stats over the accumulated sample list; None when no samples were seen.
fn timer_stats(samples: &[f64]) -> Option<TimerStats> {
    if samples.is_empty() {
        return None;
    }
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = mean_f64(samples);
    Some(TimerStats {
        count: samples.len(),
        min,
        max,
        mean,
        stdev: population_stdev(samples, mean),
    })
}

fn mean_f64(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / (v.len() as f64)
}

/// Population standard deviation: variance divides by count, not count - 1.
fn population_stdev(v: &[f64], mean: f64) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let variance = v.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (v.len() as f64);
    variance.sqrt()
}
