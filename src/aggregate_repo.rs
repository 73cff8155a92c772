// Aggregate output: <root>/aggregate/ holds three pretty-printed JSON files
// (counters, timers, gauges), each rewritten in full on every pass.

use crate::models::AggregateRecord;
use crate::snapshot_repo::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory of the sink root holding the reduced output files.
pub const AGGREGATE_DIR: &str = "aggregate";

const COUNTERS_FILE: &str = "counters";
const TIMERS_FILE: &str = "timers";
const GAUGES_FILE: &str = "gauges";

pub struct AggregateRepo {
    dir: PathBuf,
}

impl AggregateRepo {
    /// Opens the output location under `<root>/aggregate/`, creating the
    /// directory chain if absent.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = root.as_ref().join(AGGREGATE_DIR);
        fs::create_dir_all(&dir).map_err(|e| StoreError::Storage {
            path: dir.clone(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replaces the stored aggregate with `record`. A failed write surfaces
    /// as StoreError and leaves the caller to discard the in-memory record.
    pub fn write(&self, record: &AggregateRecord) -> Result<(), StoreError> {
        self.write_file(COUNTERS_FILE, &record.counters)?;
        self.write_file(TIMERS_FILE, &record.timers)?;
        self.write_file(GAUGES_FILE, &record.gauges)?;
        Ok(())
    }

    /// Reads back the three output files as one record.
    pub fn read(&self) -> Result<AggregateRecord, StoreError> {
        Ok(AggregateRecord {
            counters: self.read_file(COUNTERS_FILE)?,
            timers: self.read_file(TIMERS_FILE)?,
            gauges: self.read_file(GAUGES_FILE)?,
        })
    }

    fn write_file<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, json).map_err(|e| StoreError::Storage { path, source: e })
    }

    fn read_file<T: DeserializeOwned>(&self, name: &str) -> Result<T, StoreError> {
        let path = self.dir.join(name);
        let raw = fs::read_to_string(&path).map_err(|e| StoreError::Storage {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt { path, source: e })
    }
}
