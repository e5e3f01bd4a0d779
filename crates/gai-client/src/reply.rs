use reqwest::StatusCode;

use crate::error::ClientError;

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub status: StatusCode,
    /// Parsed JSON body, or `Null` when the body is not JSON.
    pub json: serde_json::Value,
    pub raw: String,
}

impl Reply {
    pub async fn read(resp: reqwest::Response) -> Result<Self, ClientError> {
        let status = resp.status();
        let raw = resp.text().await.map_err(ClientError::Transport)?;
        let json = serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null);
        Ok(Self { status, json, raw })
    }

    /// First string field among `fields`, if any.
    pub fn field(&self, fields: &[&str]) -> Option<String> {
        fields
            .iter()
            .find_map(|f| self.json.get(*f).and_then(|v| v.as_str()))
            .map(str::to_string)
    }

    /// Body to hand back to the caller on success.
    pub fn into_data(self) -> serde_json::Value {
        if self.json.is_null() && !self.raw.trim().is_empty() {
            serde_json::Value::String(self.raw)
        } else {
            self.json
        }
    }

    pub fn into_peer_error(self, fields: &[&str], fallback: Option<&str>) -> ClientError {
        let message = self.field(fields).unwrap_or_else(|| match fallback {
            Some(f) => f.to_string(),
            None if self.raw.trim().is_empty() => self
                .status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
            None => self.raw.clone(),
        });
        ClientError::Peer {
            status: self.status.as_u16(),
            message,
        }
    }
}
