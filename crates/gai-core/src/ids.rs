use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::{GaiError, Result};
use crate::types::RecordKind;

/// Generates record identifiers of the form `GAI-<PFX>-<millis>-<index>`.
///
/// The millisecond component is strictly increasing per generator: when two
/// batches land in the same millisecond the later one is bumped forward, so
/// ids never collide within one process even though `index` restarts at 0
/// for every batch.
#[derive(Debug)]
pub struct IdGenerator {
    prefix: String,
    last_millis: Mutex<i64>,
}

impl IdGenerator {
    pub fn new(kind: RecordKind) -> Self {
        Self::with_prefix(format!("GAI-{}", kind.id_prefix()))
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last_millis: Mutex::new(i64::MIN),
        }
    }

    /// Reserve `len` identifiers for one batch arriving at `now`.
    pub fn next_batch(&self, len: usize, now: DateTime<Utc>) -> Result<Vec<String>> {
        let mut last = self
            .last_millis
            .lock()
            .map_err(|_| GaiError::StoreUnavailable("id generator lock poisoned".into()))?;
        let millis = now.timestamp_millis().max(last.saturating_add(1));
        *last = millis;
        drop(last);

        Ok((0..len)
            .map(|i| format!("{}-{millis}-{i}", self.prefix))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_carry_prefix_time_and_position() {
        let gen = IdGenerator::new(RecordKind::Orders);
        let now = Utc::now();
        let ids = gen.next_batch(3, now).unwrap();
        let ts = now.timestamp_millis();
        assert_eq!(
            ids,
            vec![
                format!("GAI-ORD-{ts}-0"),
                format!("GAI-ORD-{ts}-1"),
                format!("GAI-ORD-{ts}-2"),
            ]
        );
    }

    #[test]
    fn same_millisecond_batches_do_not_collide() {
        let gen = IdGenerator::new(RecordKind::Fines);
        let now = Utc::now();
        let mut seen = HashSet::new();
        for _ in 0..50 {
            for id in gen.next_batch(4, now).unwrap() {
                assert!(seen.insert(id.clone()), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 200);
    }

    #[test]
    fn clock_going_backwards_still_moves_forward() {
        let gen = IdGenerator::new(RecordKind::Cameras);
        let now = Utc::now();
        let first = gen.next_batch(1, now).unwrap();
        let earlier = now - chrono::Duration::seconds(5);
        let second = gen.next_batch(1, earlier).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn empty_batch_yields_no_ids() {
        let gen = IdGenerator::new(RecordKind::Impound);
        assert!(gen.next_batch(0, Utc::now()).unwrap().is_empty());
    }
}
