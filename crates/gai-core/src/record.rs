use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GaiError, Result};
use crate::types::{Provenance, RecordKind, RelayStatus};

/// Generic envelope around a fine, impound entry, camera reading or order.
///
/// The payload is kept opaque; the relay never interprets domain fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub kind: RecordKind,
    pub payload: serde_json::Value,
    pub provenance: Provenance,
    /// Name of the sending system. Only set on external records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Set by the receiver at acceptance, never by the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_timestamp: Option<DateTime<Utc>>,
    pub relay_status: RelayStatus,
}

impl Record {
    /// A record created by a local operator action, not yet shared.
    pub fn local(id: impl Into<String>, kind: RecordKind, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            kind,
            payload,
            provenance: Provenance::Local,
            source: None,
            arrival_timestamp: None,
            relay_status: RelayStatus::NotSent,
        }
    }

    /// A record accepted from the peer system.
    pub fn received(
        id: impl Into<String>,
        kind: RecordKind,
        payload: serde_json::Value,
        source: impl Into<String>,
        arrived_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            payload,
            provenance: Provenance::External,
            source: Some(source.into()),
            arrival_timestamp: Some(arrived_at),
            relay_status: RelayStatus::New,
        }
    }

    pub fn can_transition_to(&self, target: RelayStatus) -> Result<()> {
        if self.relay_status.can_transition_to(target) {
            Ok(())
        } else {
            Err(GaiError::InvalidTransition {
                from: self.relay_status,
                to: target,
            })
        }
    }

    /// Move to `target`, leaving the record untouched if the move is illegal.
    pub fn transition(&mut self, target: RelayStatus) -> Result<()> {
        self.can_transition_to(target)?;
        self.relay_status = target;
        Ok(())
    }

    pub fn mark_sent(&mut self) -> Result<()> {
        self.transition(RelayStatus::Sent)
    }

    pub fn acknowledge(&mut self) -> Result<()> {
        self.transition(RelayStatus::Acknowledged)
    }

    pub fn fail(&mut self) -> Result<()> {
        self.transition(RelayStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn local_record_starts_not_sent() {
        let r = Record::local("f-1", RecordKind::Fines, json!({"plate": "01A123BA"}));
        assert_eq!(r.relay_status, RelayStatus::NotSent);
        assert_eq!(r.provenance, Provenance::Local);
        assert!(r.arrival_timestamp.is_none());
        assert!(r.source.is_none());
    }

    #[test]
    fn received_record_is_external_and_new() {
        let now = Utc::now();
        let r = Record::received("GAI-ORD-1-0", RecordKind::Orders, json!({}), "SMART-CITY", now);
        assert_eq!(r.provenance, Provenance::External);
        assert_eq!(r.relay_status, RelayStatus::New);
        assert_eq!(r.arrival_timestamp, Some(now));
        assert_eq!(r.source.as_deref(), Some("SMART-CITY"));
    }

    #[test]
    fn happy_path_send_then_acknowledge() {
        let mut r = Record::local("f-1", RecordKind::Fines, json!({}));
        r.mark_sent().unwrap();
        r.acknowledge().unwrap();
        assert_eq!(r.relay_status, RelayStatus::Acknowledged);
    }

    #[test]
    fn failed_send_can_be_retried() {
        let mut r = Record::local("f-1", RecordKind::Fines, json!({}));
        r.mark_sent().unwrap();
        r.fail().unwrap();
        r.mark_sent().unwrap();
        assert_eq!(r.relay_status, RelayStatus::Sent);
    }

    #[test]
    fn illegal_transition_leaves_status_unchanged() {
        let mut r = Record::local("f-1", RecordKind::Fines, json!({}));
        let err = r.acknowledge().unwrap_err();
        assert!(matches!(
            err,
            GaiError::InvalidTransition {
                from: RelayStatus::NotSent,
                to: RelayStatus::Acknowledged
            }
        ));
        assert_eq!(r.relay_status, RelayStatus::NotSent);
    }

    #[test]
    fn acknowledged_record_cannot_be_resent() {
        let mut r = Record::local("f-1", RecordKind::Fines, json!({}));
        r.mark_sent().unwrap();
        r.acknowledge().unwrap();
        assert!(r.mark_sent().is_err());
        assert_eq!(r.relay_status, RelayStatus::Acknowledged);
    }

    #[test]
    fn serializes_camel_case_and_skips_absent_fields() {
        let r = Record::local("f-1", RecordKind::Fines, json!({"amount": 500000}));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["relayStatus"], "NOT_SENT");
        assert_eq!(v["provenance"], "LOCAL");
        assert_eq!(v["kind"], "fines");
        assert!(v.get("arrivalTimestamp").is_none());
        assert!(v.get("source").is_none());
    }
}
