use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

/// The kinds of records that travel over the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Fines,
    Impound,
    Cameras,
    Orders,
}

impl RecordKind {
    pub fn all() -> &'static [RecordKind] {
        &[
            RecordKind::Fines,
            RecordKind::Impound,
            RecordKind::Cameras,
            RecordKind::Orders,
        ]
    }

    /// Path segment and body field name for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Fines => "fines",
            RecordKind::Impound => "impound",
            RecordKind::Cameras => "cameras",
            RecordKind::Orders => "orders",
        }
    }

    /// Short tag embedded in generated identifiers.
    pub fn id_prefix(self) -> &'static str {
        match self {
            RecordKind::Fines => "FIN",
            RecordKind::Impound => "IMP",
            RecordKind::Cameras => "CAM",
            RecordKind::Orders => "ORD",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = crate::error::GaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fines" => Ok(RecordKind::Fines),
            "impound" => Ok(RecordKind::Impound),
            "cameras" => Ok(RecordKind::Cameras),
            "orders" => Ok(RecordKind::Orders),
            _ => Err(crate::error::GaiError::UnknownKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provenance {
    Local,
    External,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Local => f.write_str("LOCAL"),
            Provenance::External => f.write_str("EXTERNAL"),
        }
    }
}

// ---------------------------------------------------------------------------
// RelayStatus
// ---------------------------------------------------------------------------

/// Where a record stands in the relay lifecycle.
///
/// `New` is the initial status of records accepted from the peer. Local
/// records start at `NotSent` and move forward through `Sent` to either
/// `Acknowledged` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelayStatus {
    New,
    NotSent,
    Sent,
    Acknowledged,
    Failed,
}

impl RelayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RelayStatus::New => "NEW",
            RelayStatus::NotSent => "NOT_SENT",
            RelayStatus::Sent => "SENT",
            RelayStatus::Acknowledged => "ACKNOWLEDGED",
            RelayStatus::Failed => "FAILED",
        }
    }

    /// Whether moving from `self` to `target` keeps the status monotonic.
    /// `Failed -> Sent` is a caller-initiated retry.
    pub fn can_transition_to(self, target: RelayStatus) -> bool {
        matches!(
            (self, target),
            (RelayStatus::NotSent, RelayStatus::Sent)
                | (RelayStatus::Sent, RelayStatus::Acknowledged)
                | (RelayStatus::Sent, RelayStatus::Failed)
                | (RelayStatus::Failed, RelayStatus::Sent)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RelayStatus::Acknowledged)
    }
}

impl fmt::Display for RelayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelayStatus {
    type Err = crate::error::GaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(RelayStatus::New),
            "NOT_SENT" => Ok(RelayStatus::NotSent),
            "SENT" => Ok(RelayStatus::Sent),
            "ACKNOWLEDGED" => Ok(RelayStatus::Acknowledged),
            "FAILED" => Ok(RelayStatus::Failed),
            _ => Err(crate::error::GaiError::InvalidStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in RecordKind::all() {
            let parsed: RecordKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!("vehicles".parse::<RecordKind>().is_err());
        assert!("Fines".parse::<RecordKind>().is_err());
    }

    #[test]
    fn id_prefixes_are_distinct() {
        let mut prefixes: Vec<_> = RecordKind::all().iter().map(|k| k.id_prefix()).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), RecordKind::all().len());
    }

    #[test]
    fn sent_never_goes_back_to_not_sent() {
        assert!(!RelayStatus::Sent.can_transition_to(RelayStatus::NotSent));
        assert!(!RelayStatus::Failed.can_transition_to(RelayStatus::NotSent));
        assert!(!RelayStatus::Acknowledged.can_transition_to(RelayStatus::NotSent));
    }

    #[test]
    fn acknowledged_is_terminal() {
        for target in [
            RelayStatus::New,
            RelayStatus::NotSent,
            RelayStatus::Sent,
            RelayStatus::Failed,
        ] {
            assert!(!RelayStatus::Acknowledged.can_transition_to(target));
        }
        assert!(RelayStatus::Acknowledged.is_terminal());
    }

    #[test]
    fn failed_may_be_resent() {
        assert!(RelayStatus::Failed.can_transition_to(RelayStatus::Sent));
    }

    #[test]
    fn new_records_are_not_relayed_onward() {
        assert!(!RelayStatus::New.can_transition_to(RelayStatus::Sent));
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&RelayStatus::NotSent).unwrap();
        assert_eq!(json, "\"NOT_SENT\"");
        let parsed: RelayStatus = "ACKNOWLEDGED".parse().unwrap();
        assert_eq!(parsed, RelayStatus::Acknowledged);
    }

    #[test]
    fn provenance_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&Provenance::External).unwrap(),
            "\"EXTERNAL\""
        );
        assert_eq!(Provenance::Local.to_string(), "LOCAL");
    }
}
