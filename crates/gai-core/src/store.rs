use std::sync::{Mutex, MutexGuard};

use crate::error::{GaiError, Result};
use crate::record::Record;

/// Storage for stamped records of one kind.
///
/// Implementations must keep insertion order and keep each appended batch
/// contiguous when called concurrently.
pub trait RecordStore: Send + Sync {
    /// Append `records` in order and return their identifiers in the same order.
    fn append(&self, records: Vec<Record>) -> Result<Vec<String>>;

    /// Snapshot of every stored record, in insertion order.
    fn list(&self) -> Result<Vec<Record>>;

    fn count(&self) -> Result<usize>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Process-lifetime store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Record>>> {
        self.records
            .lock()
            .map_err(|_| GaiError::StoreUnavailable("record store lock poisoned".into()))
    }
}

impl RecordStore for MemoryStore {
    fn append(&self, records: Vec<Record>) -> Result<Vec<String>> {
        let ids = records.iter().map(|r| r.id.clone()).collect();
        self.lock()?.extend(records);
        Ok(ids)
    }

    fn list(&self) -> Result<Vec<Record>> {
        Ok(self.lock()?.clone())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}
