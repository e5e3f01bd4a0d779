//! `gai-client` — outbound HTTP side of the GAI back-office.
//!
//! Two independent clients live here:
//!
//! ```text
//! RelayClient     ← POST/GET {peer}/relay/{kind} with the outbound X-API-Key
//!     │              dispatch() drives NOT_SENT → SENT → ACKNOWLEDGED | FAILED
//!     ▼
//! peer system (SMART-CITY)
//!
//! SessionManager  ← bearer-token calls to the operator back-end
//!     │              one refresh + one retry on 401, then EXPIRED
//!     ▼
//! TokenStore      ← access/refresh token files between invocations
//! ```
//!
//! Both return [`gai_core::ApiResponse`] so callers never handle raw
//! transport errors.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use gai_client::RelayClient;
//! use gai_core::RecordKind;
//!
//! let client = RelayClient::new("http://localhost:3000", "key", timeout)?;
//! let result = client.send_batch(RecordKind::Fines, &[payload]).await;
//! assert!(result.success);
//! ```

pub mod error;
pub mod relay;
pub mod session;
pub mod tokens;

pub(crate) mod reply;

pub use error::ClientError;
pub use relay::{RelayClient, RelayResult};
pub use session::{LoginResponse, SessionManager, SessionState, User};
pub use tokens::{CredentialPair, TokenStore};
