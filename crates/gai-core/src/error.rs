use thiserror::Error;

use crate::types::RelayStatus;

#[derive(Debug, Error)]
pub enum GaiError {
    #[error("Invalid API key")]
    Unauthorized,

    #[error("{0} array is required")]
    MissingBatch(String),

    #[error("unknown record kind: {0}")]
    UnknownKind(String),

    #[error("invalid relay status: {0}")]
    InvalidStatus(String),

    #[error("invalid relay status transition from {from} to {to}")]
    InvalidTransition { from: RelayStatus, to: RelayStatus },

    #[error("record store is unavailable: {0}")]
    StoreUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GaiError>;
