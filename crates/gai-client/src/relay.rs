use std::time::Duration;

use gai_core::auth::API_KEY_HEADER;
use gai_core::config::Config;
use gai_core::{ApiResponse, Record, RecordKind, RelayStatus};

use crate::error::{ClientError, RELAY_FAILED};
use crate::reply::Reply;

pub type RelayResult = ApiResponse<serde_json::Value>;

/// Sends records to the counterpart system's relay receiver.
///
/// Every call is single-shot: no retry and no coalescing. Failures come back
/// as `success: false` results, never as errors.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RelayClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let key = config.require_outbound_key()?;
        Self::new(&config.peer.url, key, config.request_timeout())
    }

    fn url(&self, kind: RecordKind) -> String {
        format!("{}/relay/{}", self.base_url, kind)
    }

    /// POST `{ "<kind>": records }` to the peer.
    ///
    /// An empty slice is sent as-is; the peer treats it as a no-op.
    pub async fn send_batch(&self, kind: RecordKind, records: &[serde_json::Value]) -> RelayResult {
        match self.try_send(kind, records).await {
            Ok(data) => {
                let message = data
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string);
                tracing::info!(kind = %kind, count = records.len(), "relayed batch to peer");
                ApiResponse::ok(data).with_message(message)
            }
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "relay to peer failed");
                ApiResponse::failure(e.to_string())
            }
        }
    }

    async fn try_send(
        &self,
        kind: RecordKind,
        records: &[serde_json::Value],
    ) -> Result<serde_json::Value, ClientError> {
        let mut body = serde_json::Map::new();
        body.insert(
            kind.as_str().to_string(),
            serde_json::Value::Array(records.to_vec()),
        );

        let resp = self
            .http
            .post(self.url(kind))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let reply = Reply::read(resp).await?;

        if !reply.status.is_success() {
            return Err(reply.into_peer_error(&["message"], Some(RELAY_FAILED)));
        }
        Ok(reply.into_data())
    }

    /// Share local records with the peer, tracking their relay status.
    ///
    /// All records move to `SENT` before the request and then together to
    /// `ACKNOWLEDGED` or `FAILED`. If any record may not be sent (wrong kind,
    /// already acknowledged, received from the peer) nothing is sent and no
    /// status changes.
    pub async fn dispatch(&self, kind: RecordKind, records: &mut [Record]) -> RelayResult {
        for record in records.iter() {
            if record.kind != kind {
                return ApiResponse::failure(format!(
                    "record {} is a {} record, not {kind}",
                    record.id, record.kind
                ));
            }
            if record.relay_status.is_terminal() {
                return ApiResponse::failure(format!(
                    "record {} was already acknowledged by the peer",
                    record.id
                ));
            }
            if let Err(e) = record.can_transition_to(RelayStatus::Sent) {
                return ApiResponse::failure(format!("record {}: {e}", record.id));
            }
        }

        for record in records.iter_mut() {
            if let Err(e) = record.mark_sent() {
                return ApiResponse::failure(format!("record {}: {e}", record.id));
            }
        }

        let payloads: Vec<serde_json::Value> = records.iter().map(|r| r.payload.clone()).collect();
        let result = self.send_batch(kind, &payloads).await;

        for record in records.iter_mut() {
            let outcome = if result.success {
                record.acknowledge()
            } else {
                record.fail()
            };
            if let Err(e) = outcome {
                tracing::error!(id = %record.id, error = %e, "relay status update rejected");
            }
        }
        result
    }

    /// GET everything the peer has stored for `kind`.
    pub async fn list_remote(&self, kind: RecordKind) -> RelayResult {
        match self.try_list(kind).await {
            Ok(data) => ApiResponse::ok(data),
            Err(e) => ApiResponse::failure(e.to_string()),
        }
    }

    async fn try_list(&self, kind: RecordKind) -> Result<serde_json::Value, ClientError> {
        let resp = self
            .http
            .get(self.url(kind))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let reply = Reply::read(resp).await?;
        if !reply.status.is_success() {
            return Err(reply.into_peer_error(&["message"], Some(RELAY_FAILED)));
        }
        Ok(reply.into_data())
    }

    /// Authenticated probe against the peer's fines relay.
    pub async fn check_connection(&self) -> RelayResult {
        let resp = self
            .http
            .get(self.url(RecordKind::Fines))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await;
        match resp {
            Ok(r) if r.status().is_success() => ApiResponse::ok_message("Connection successful"),
            Ok(r) => {
                tracing::warn!(status = %r.status(), "peer connection check failed");
                ApiResponse::failure("Connection failed")
            }
            Err(e) => {
                tracing::warn!(error = %e, "peer is not reachable");
                ApiResponse::failure("peer is not reachable")
            }
        }
    }
}
