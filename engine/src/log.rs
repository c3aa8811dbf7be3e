//! The record log: the storage collaborator the store delegates to.
//!
//! The store needs only keyed puts, gets, deletes and whole-collection scans.
//! Durability, replication and cross-process isolation are the log's own
//! business. [`MemoryLog`] is the in-process implementation.

use crate::record::{Identity, Record};
use crate::{error::Result, CollectionName, Error, Version};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Storage backend interface.
///
/// Each call must be atomic on its own. `scan` must return a consistent
/// snapshot of the collection: no record may be observed half-written.
pub trait RecordLog: Send + Sync {
    /// Store `payload` under `(collection, id)`, replacing any previous
    /// record. Returns the new version.
    fn put(&self, collection: &str, id: &Identity, payload: Value) -> Result<Version>;

    /// Fetch a record.
    fn get(&self, collection: &str, id: &Identity) -> Result<Option<Record>>;

    /// Remove a record. Returns whether it existed.
    fn delete(&self, collection: &str, id: &Identity) -> Result<bool>;

    /// Snapshot every record of a collection, in a deterministic order.
    fn scan(&self, collection: &str) -> Result<Vec<Record>>;

    /// Push buffered writes to durable storage.
    fn flush(&self) -> Result<()>;

    /// Release the backing resources. Later calls fail.
    fn close(&self) -> Result<()>;
}

#[derive(Debug, Default)]
struct LogState {
    /// Records by collection, then identity. BTreeMap keeps scans ordered.
    collections: HashMap<CollectionName, BTreeMap<Identity, Record>>,
    closed: bool,
}

/// In-memory record log.
///
/// Scans copy the collection under a read lock, so each one is a snapshot
/// taken at call time.
#[derive(Debug, Default)]
pub struct MemoryLog {
    state: RwLock<LogState>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all collections.
    pub fn len(&self) -> usize {
        self.state.read().collections.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the log has been closed.
    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }
}

fn closed_error() -> Error {
    Error::StorageFailure("log is closed".into())
}

impl RecordLog for MemoryLog {
    fn put(&self, collection: &str, id: &Identity, payload: Value) -> Result<Version> {
        let mut state = self.state.write();
        if state.closed {
            return Err(closed_error());
        }

        let records = state.collections.entry(collection.to_string()).or_default();
        let version = records.get(id).map_or(1, |r| r.version + 1);
        records.insert(
            id.clone(),
            Record::new(id.clone(), collection, payload, version),
        );
        Ok(version)
    }

    fn get(&self, collection: &str, id: &Identity) -> Result<Option<Record>> {
        let state = self.state.read();
        if state.closed {
            return Err(closed_error());
        }
        Ok(state
            .collections
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned())
    }

    fn delete(&self, collection: &str, id: &Identity) -> Result<bool> {
        let mut state = self.state.write();
        if state.closed {
            return Err(closed_error());
        }
        Ok(state
            .collections
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .is_some())
    }

    fn scan(&self, collection: &str) -> Result<Vec<Record>> {
        let state = self.state.read();
        if state.closed {
            return Err(closed_error());
        }
        Ok(state
            .collections
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    fn flush(&self) -> Result<()> {
        if self.state.read().closed {
            return Err(closed_error());
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.write();
        if state.closed {
            return Err(closed_error());
        }
        state.closed = true;
        state.collections.clear();
        Ok(())
    }
}
