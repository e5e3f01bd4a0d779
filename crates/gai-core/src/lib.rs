pub mod auth;
pub mod config;
pub mod error;
pub mod ids;
pub mod inbox;
pub mod io;
pub mod record;
pub mod response;
pub mod store;
pub mod types;

pub use error::{GaiError, Result};
pub use record::Record;
pub use response::ApiResponse;
pub use types::{Provenance, RecordKind, RelayStatus};
