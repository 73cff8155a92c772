// Flush pipeline (same stages as the statsd file backend): write snapshot ->
// sweep expired -> rebuild aggregate. A dispatcher task consumes sink events
// from a channel, so at most one cycle is ever in flight.

use crate::aggregate_repo::AggregateRepo;
use crate::models::{MetricsPayload, MetricsSnapshot};
use crate::snapshot_repo::{SnapshotStore, StoreError, aggregation};
use crate::sweep;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, interval};
use tracing::{debug, info, warn};

/// Source name reported on status queries.
pub const SOURCE_NAME: &str = "file";

/// Status timestamps, epoch seconds. Both start at process-start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineState {
    pub last_flush_time: u64,
    pub last_exception_time: u64,
}

/// One status field as emitted to a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusField {
    pub source: &'static str,
    pub field: &'static str,
    pub value: u64,
}

/// Events accepted by the dispatcher; the channel is the serialization point
/// for callers.
#[derive(Debug)]
pub enum SinkEvent {
    Flush {
        timestamp_secs: u64,
        metrics: MetricsPayload,
    },
    Status {
        reply: oneshot::Sender<Vec<StatusField>>,
    },
}

/// The three-stage flush pipeline. There is exactly one logical writer;
/// callers must serialize cycles (the dispatcher's channel does).
pub struct FilePipeline<S> {
    store: S,
    aggregate_repo: AggregateRepo,
    retention_ms: u64,
    state: PipelineState,
    flushes_total: u64,
    flush_failures_total: u64,
    snapshots_pruned_total: u64,
}

impl<S: SnapshotStore> FilePipeline<S> {
    pub fn new(
        store: S,
        aggregate_repo: AggregateRepo,
        retention_ms: u64,
        startup_secs: u64,
    ) -> Self {
        Self {
            store,
            aggregate_repo,
            retention_ms,
            state: PipelineState {
                last_flush_time: startup_secs,
                last_exception_time: startup_secs,
            },
            flushes_total: 0,
            flush_failures_total: 0,
            snapshots_pruned_total: 0,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Runs one flush cycle. Any stage failure abandons the cycle (the
    /// snapshot written in stage one is not rolled back) and records
    /// last_exception_time; the next flush is the retry.
    pub fn on_flush(
        &mut self,
        timestamp_secs: u64,
        metrics: MetricsPayload,
    ) -> Result<(), StoreError> {
        // the host ticks in seconds; store keys operate on millis
        let millis = timestamp_secs * 1000;
        info!(operation = "flush", timestamp_ms = millis, "flushing stats");

        match self.run_cycle(millis, metrics) {
            Ok(()) => {
                self.state.last_flush_time = timestamp_secs;
                self.flushes_total += 1;
                Ok(())
            }
            Err(e) => {
                self.state.last_exception_time = timestamp_secs;
                self.flush_failures_total += 1;
                Err(e)
            }
        }
    }

    fn run_cycle(&mut self, millis: u64, metrics: MetricsPayload) -> Result<(), StoreError> {
        let snapshot = MetricsSnapshot {
            timestamp: millis,
            metrics,
        };
        self.store.write(&snapshot)?;
        debug!(operation = "write_snapshot", timestamp_ms = millis, "raw metrics saved");

        let outcome = sweep::sweep(&self.store, millis, self.retention_ms)?;
        self.snapshots_pruned_total += outcome.deleted;

        let snapshots = self.store.read_all()?;
        let record = aggregation::reduce(&snapshots);
        self.aggregate_repo.write(&record)?;
        debug!(
            operation = "aggregate",
            snapshots = snapshots.len(),
            "aggregate rebuilt"
        );
        Ok(())
    }

    /// Emits one `(source, field, value)` tuple per status field. Never fails.
    pub fn on_status(&self, mut reporter: impl FnMut(&'static str, &'static str, u64)) {
        reporter(SOURCE_NAME, "lastFlush", self.state.last_flush_time);
        reporter(SOURCE_NAME, "lastException", self.state.last_exception_time);
    }

    fn status_fields(&self) -> Vec<StatusField> {
        let mut fields = Vec::with_capacity(2);
        self.on_status(|source, field, value| {
            fields.push(StatusField {
                source,
                field,
                value,
            })
        });
        fields
    }
}

/// Dispatcher timing config.
pub struct DispatcherConfig {
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Spawns the dispatcher task: consumes sink events sequentially until the
/// channel closes or shutdown fires. Flush failures are logged and absorbed;
/// the task stays ready for the next event.
pub fn spawn<S: SnapshotStore + Send + 'static>(
    mut rx: mpsc::Receiver<SinkEvent>,
    mut pipeline: FilePipeline<S>,
    config: DispatcherConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut stats_log_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                event = rx.recv() => {
                    match event {
                        Some(SinkEvent::Flush { timestamp_secs, metrics }) => {
                            if let Err(e) = pipeline.on_flush(timestamp_secs, metrics) {
                                warn!(
                                    error = %e,
                                    operation = "flush",
                                    timestamp_secs,
                                    "flush cycle abandoned"
                                );
                            }
                        }
                        Some(SinkEvent::Status { reply }) => {
                            let _ = reply.send(pipeline.status_fields());
                        }
                        None => break,
                    }
                }
                _ = &mut shutdown_rx => {
                    debug!("Dispatcher shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    info!(
                        flushes_total = pipeline.flushes_total,
                        flush_failures_total = pipeline.flush_failures_total,
                        snapshots_pruned_total = pipeline.snapshots_pruned_total,
                        "app stats"
                    );
                }
            }
        }
    })
}
