use thiserror::Error;

/// Message used for every transport-level failure. This is a local
/// classification; nothing from the peer is involved.
pub const CONNECTION_FAILED: &str = "connection failed";

/// Fallback when the peer rejects a relay call without a usable message.
pub const RELAY_FAILED: &str = "relay failed";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection failed")]
    Transport(#[source] reqwest::Error),

    /// The remote system answered with a non-success status.
    #[error("{message}")]
    Peer { status: u16, message: String },

    #[error("not logged in; run `gai login` first")]
    NotAuthenticated,

    /// Refresh was refused; the stored tokens have been discarded.
    #[error("session expired; log in again")]
    SessionExpired,

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Core(#[from] gai_core::GaiError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Peer { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
