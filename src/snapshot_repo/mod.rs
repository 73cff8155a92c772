// File-backed snapshot store. One pretty-printed JSON file per flush under
// <root>/raw/, filename = millisecond timestamp. Pure reduction logic lives
// in aggregation.rs; this module only does storage.

pub mod aggregation;

use crate::models::{MetricsPayload, MetricsSnapshot};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Subdirectory of the sink root holding raw snapshot files.
pub const RAW_DIR: &str = "raw";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt snapshot {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value view of the snapshot set: timestamps in, snapshots out.
/// The store gives no ordering guarantee; callers impose order where needed.
pub trait SnapshotStore {
    /// Persists a snapshot keyed by its timestamp. Writing the same
    /// timestamp twice overwrites.
    fn write(&self, snapshot: &MetricsSnapshot) -> Result<(), StoreError>;

    /// All stored timestamps, in no particular order.
    fn list_all(&self) -> Result<Vec<u64>, StoreError>;

    /// All stored snapshots. A corrupt entry is logged and skipped; it never
    /// aborts the read of the remaining entries.
    fn read_all(&self) -> Result<Vec<MetricsSnapshot>, StoreError>;

    /// Removes a snapshot. Deleting an absent timestamp is a no-op.
    fn delete(&self, timestamp: u64) -> Result<(), StoreError>;
}

pub struct FileSnapshotRepo {
    raw_dir: PathBuf,
}

impl FileSnapshotRepo {
    /// Opens the store under `<root>/raw/`, creating the directory chain if
    /// absent.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw_dir = root.as_ref().join(RAW_DIR);
        fs::create_dir_all(&raw_dir).map_err(|e| StoreError::Storage {
            path: raw_dir.clone(),
            source: e,
        })?;
        Ok(Self { raw_dir })
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    fn snapshot_path(&self, timestamp: u64) -> PathBuf {
        self.raw_dir.join(timestamp.to_string())
    }

    fn read_one(&self, timestamp: u64) -> Result<MetricsSnapshot, StoreError> {
        let path = self.snapshot_path(timestamp);
        let raw = fs::read_to_string(&path).map_err(|e| StoreError::Storage {
            path: path.clone(),
            source: e,
        })?;
        let metrics: MetricsPayload =
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt { path, source: e })?;
        Ok(MetricsSnapshot { timestamp, metrics })
    }
}

impl SnapshotStore for FileSnapshotRepo {
    fn write(&self, snapshot: &MetricsSnapshot) -> Result<(), StoreError> {
        let path = self.snapshot_path(snapshot.timestamp);
        let json = serde_json::to_string_pretty(&snapshot.metrics).map_err(|e| {
            StoreError::Corrupt {
                path: path.clone(),
                source: e,
            }
        })?;
        fs::write(&path, json).map_err(|e| StoreError::Storage { path, source: e })
    }

    fn list_all(&self) -> Result<Vec<u64>, StoreError> {
        let entries = fs::read_dir(&self.raw_dir).map_err(|e| StoreError::Storage {
            path: self.raw_dir.clone(),
            source: e,
        })?;
        let mut timestamps = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Storage {
                path: self.raw_dir.clone(),
                source: e,
            })?;
            let name = entry.file_name();
            match name.to_string_lossy().parse::<u64>() {
                Ok(ts) => timestamps.push(ts),
                Err(_) => {
                    // stray non-snapshot files are not ours to manage
                    debug!(
                        operation = "list_all",
                        file = %name.to_string_lossy(),
                        "ignoring non-snapshot file in raw directory"
                    );
                }
            }
        }
        Ok(timestamps)
    }

    fn read_all(&self) -> Result<Vec<MetricsSnapshot>, StoreError> {
        let timestamps = self.list_all()?;
        let mut out = Vec::with_capacity(timestamps.len());
        for ts in timestamps {
            match self.read_one(ts) {
                Ok(snapshot) => out.push(snapshot),
                Err(e) => {
                    warn!(
                        error = %e,
                        operation = "read_all",
                        timestamp = ts,
                        "skipping unreadable snapshot"
                    );
                }
            }
        }
        Ok(out)
    }

    fn delete(&self, timestamp: u64) -> Result<(), StoreError> {
        let path = self.snapshot_path(timestamp);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Storage { path, source: e }),
        }
    }
}
