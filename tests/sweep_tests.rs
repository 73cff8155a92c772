// Retention sweep tests: cutoff semantics and per-entry failure isolation

mod common;

use common::{counters_only, snapshot};
use statsink::models::MetricsSnapshot;
use statsink::snapshot_repo::{FileSnapshotRepo, SnapshotStore, StoreError};
use statsink::sweep::sweep;
use tempfile::TempDir;

fn store_with(timestamps: &[u64]) -> (TempDir, FileSnapshotRepo) {
    let dir = TempDir::new().unwrap();
    let repo = FileSnapshotRepo::open(dir.path()).unwrap();
    for &ts in timestamps {
        repo.write(&snapshot(ts, counters_only(&[]))).unwrap();
    }
    (dir, repo)
}

fn remaining(repo: &FileSnapshotRepo) -> Vec<u64> {
    let mut ts = repo.list_all().unwrap();
    ts.sort_unstable();
    ts
}

#[test]
fn sweep_deletes_expired_and_retains_at_cutoff() {
    let (_dir, repo) = store_with(&[1000, 4000, 5000, 9000]);

    // cutoff = 10000 - 5000; 5000 sits exactly at the cutoff and stays
    let outcome = sweep(&repo, 10_000, 5000).unwrap();

    assert_eq!(outcome.examined, 4);
    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.failed, 0);
    assert_eq!(remaining(&repo), vec![5000, 9000]);
}

#[test]
fn sweep_with_retention_longer_than_now_deletes_nothing() {
    let (_dir, repo) = store_with(&[1000, 2000]);

    let outcome = sweep(&repo, 3000, 5000).unwrap();

    assert_eq!(outcome.deleted, 0);
    assert_eq!(remaining(&repo), vec![1000, 2000]);
}

#[test]
fn sweep_with_zero_retention_keeps_only_now() {
    let (_dir, repo) = store_with(&[1000, 2000, 3000]);

    let outcome = sweep(&repo, 3000, 0).unwrap();

    assert_eq!(outcome.deleted, 2);
    assert_eq!(remaining(&repo), vec![3000]);
}

#[test]
fn sweep_on_empty_store_is_a_no_op() {
    let (_dir, repo) = store_with(&[]);

    let outcome = sweep(&repo, 10_000, 1000).unwrap();

    assert_eq!(outcome.examined, 0);
    assert_eq!(outcome.deleted, 0);
}

/// Store whose delete fails for one timestamp; everything else passes through.
struct FlakyDeleteStore {
    inner: FileSnapshotRepo,
    fail_at: u64,
}

impl SnapshotStore for FlakyDeleteStore {
    fn write(&self, snapshot: &MetricsSnapshot) -> Result<(), StoreError> {
        self.inner.write(snapshot)
    }

    fn list_all(&self) -> Result<Vec<u64>, StoreError> {
        self.inner.list_all()
    }

    fn read_all(&self) -> Result<Vec<MetricsSnapshot>, StoreError> {
        self.inner.read_all()
    }

    fn delete(&self, timestamp: u64) -> Result<(), StoreError> {
        if timestamp == self.fail_at {
            return Err(StoreError::Storage {
                path: self.inner.raw_dir().join(timestamp.to_string()),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked"),
            });
        }
        self.inner.delete(timestamp)
    }
}

#[test]
fn one_failed_deletion_does_not_stop_the_sweep() {
    let (_dir, inner) = store_with(&[1000, 2000, 3000]);
    let store = FlakyDeleteStore {
        inner,
        fail_at: 2000,
    };

    let outcome = sweep(&store, 10_000, 1000).unwrap();

    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(remaining(&store.inner), vec![2000]);
}
