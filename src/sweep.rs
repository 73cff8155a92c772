// Retention sweep: best-effort deletion of snapshots older than the cutoff.

use crate::snapshot_repo::{SnapshotStore, StoreError};
use tracing::{debug, warn};

/// What one sweep did. Deletion failures are counted, never propagated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub examined: usize,
    pub deleted: u64,
    pub failed: u64,
}

/// Deletes every stored snapshot with `timestamp < now_ms - retention_ms`.
/// A snapshot exactly at the cutoff is retained. Individual deletions are
/// independent; one failure does not stop the rest. Only a failure to list
/// the store is fatal.
pub fn sweep<S: SnapshotStore>(
    store: &S,
    now_ms: u64,
    retention_ms: u64,
) -> Result<SweepOutcome, StoreError> {
    let cutoff = now_ms.saturating_sub(retention_ms);
    let timestamps = store.list_all()?;
    debug!(
        operation = "sweep",
        now_ms,
        cutoff,
        examined = timestamps.len(),
        "running cleanup"
    );

    let mut outcome = SweepOutcome {
        examined: timestamps.len(),
        ..Default::default()
    };
    for ts in timestamps {
        if ts >= cutoff {
            continue;
        }
        match store.delete(ts) {
            Ok(()) => {
                debug!(operation = "sweep", timestamp = ts, "deleted expired snapshot");
                outcome.deleted += 1;
            }
            Err(e) => {
                warn!(
                    error = %e,
                    operation = "sweep",
                    timestamp = ts,
                    "failed to delete expired snapshot"
                );
                outcome.failed += 1;
            }
        }
    }
    Ok(outcome)
}
