// Domain models (ported from the statsd file backend)

mod aggregate;
mod snapshot;

pub use aggregate::{AggregateRecord, TimerAggregate, TimerStats};
pub use snapshot::{MetricsPayload, MetricsSnapshot};
