//! Inbound side of the relay: validation and stamping of peer batches.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{GaiError, Result};
use crate::ids::IdGenerator;
use crate::record::Record;
use crate::store::RecordStore;
use crate::types::RecordKind;

/// Outcome of an accepted batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub count: usize,
    pub received_at: DateTime<Utc>,
    /// `ids[i]` belongs to the i-th record of the submitted batch.
    pub ids: Vec<String>,
}

/// Pull the `<kind>` array out of a raw request body.
///
/// Malformed JSON, a missing field, or a non-array field are all the same
/// validation failure. An empty array is accepted.
pub fn parse_batch(kind: RecordKind, body: &[u8]) -> Result<Vec<serde_json::Value>> {
    let missing = || GaiError::MissingBatch(kind.as_str().to_string());
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|_| missing())?;
    match value {
        serde_json::Value::Object(mut map) => match map.remove(kind.as_str()) {
            Some(serde_json::Value::Array(items)) => Ok(items),
            _ => Err(missing()),
        },
        _ => Err(missing()),
    }
}

/// Accepts batches of one record kind from one peer system.
pub struct RelayInbox {
    kind: RecordKind,
    source: String,
    ids: Arc<IdGenerator>,
    store: Arc<dyn RecordStore>,
}

impl RelayInbox {
    pub fn new(kind: RecordKind, source: impl Into<String>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            kind,
            source: source.into(),
            ids: Arc::new(IdGenerator::new(kind)),
            store,
        }
    }

    /// Same kind, source and id generator, backed by `store`. Ids issued
    /// after the swap keep increasing past those issued before it.
    pub fn with_store(&self, store: Arc<dyn RecordStore>) -> Self {
        Self {
            kind: self.kind,
            source: self.source.clone(),
            ids: Arc::clone(&self.ids),
            store,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn accept(&self, payloads: Vec<serde_json::Value>) -> Result<Receipt> {
        self.accept_at(payloads, Utc::now())
    }

    /// Stamp every payload with a fresh id, the shared arrival time, the
    /// peer's name and status `NEW`, then store the whole batch at once.
    pub fn accept_at(
        &self,
        payloads: Vec<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<Receipt> {
        let ids = self.ids.next_batch(payloads.len(), now)?;
        let records: Vec<Record> = ids
            .into_iter()
            .zip(payloads)
            .map(|(id, payload)| Record::received(id, self.kind, payload, &self.source, now))
            .collect();

        let ids = self.store.append(records)?;
        tracing::info!(
            kind = %self.kind,
            source = %self.source,
            count = ids.len(),
            "accepted relay batch"
        );

        Ok(Receipt {
            count: ids.len(),
            received_at: now,
            ids,
        })
    }

    pub fn list(&self) -> Result<Vec<Record>> {
        self.store.list()
    }

    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }
}
