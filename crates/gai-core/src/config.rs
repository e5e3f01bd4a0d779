use crate::error::{GaiError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "gai.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

/// The operator back-end reached through the session manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Where the access/refresh tokens are kept between CLI invocations.
    #[serde(default)]
    pub token_dir: Option<PathBuf>,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            token_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// PeerConfig
// ---------------------------------------------------------------------------

/// The counterpart system. Each direction has its own secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerConfig {
    #[serde(default = "default_peer_name")]
    pub name: String,
    #[serde(default = "default_peer_url")]
    pub url: String,
    /// Key the peer must present when calling our relay.
    #[serde(default)]
    pub inbound_api_key: Option<String>,
    /// Key we present when calling the peer's relay.
    #[serde(default)]
    pub outbound_api_key: Option<String>,
}

fn default_peer_name() -> String {
    "SMART-CITY".to_string()
}

fn default_peer_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            name: default_peer_name(),
            url: default_peer_url(),
            inbound_api_key: None,
            outbound_api_key: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_system_name")]
    pub system_name: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub peer: PeerConfig,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_system_name() -> String {
    "GAI".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system_name: default_system_name(),
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
            peer: PeerConfig::default(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Apply `GAI_*` overrides. `lookup` is usually `std::env::var(..).ok()`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("GAI_BACKEND_URL") {
            self.backend.url = v;
        }
        if let Some(v) = lookup("GAI_PEER_URL") {
            self.peer.url = v;
        }
        if let Some(v) = lookup("GAI_INBOUND_API_KEY") {
            self.peer.inbound_api_key = Some(v);
        }
        if let Some(v) = lookup("GAI_OUTBOUND_API_KEY") {
            self.peer.outbound_api_key = Some(v);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn require_inbound_key(&self) -> Result<&str> {
        non_empty(self.peer.inbound_api_key.as_deref())
            .ok_or_else(|| GaiError::Config("peer.inbound_api_key is not set".into()))
    }

    pub fn require_outbound_key(&self) -> Result<&str> {
        non_empty(self.peer.outbound_api_key.as_deref())
            .ok_or_else(|| GaiError::Config("peer.outbound_api_key is not set".into()))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (field, url) in [("backend.url", &self.backend.url), ("peer.url", &self.peer.url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{field} '{url}' must start with http:// or https://"),
                });
            }
        }

        if self.request_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "request_timeout_secs must be greater than zero".into(),
            });
        }

        if non_empty(self.peer.inbound_api_key.as_deref()).is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "peer.inbound_api_key is not set; the relay receiver will not start"
                    .into(),
            });
        }
        if non_empty(self.peer.outbound_api_key.as_deref()).is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "peer.outbound_api_key is not set; records cannot be sent to the peer"
                    .into(),
            });
        }

        if let (Some(inbound), Some(outbound)) = (
            self.peer.inbound_api_key.as_deref(),
            self.peer.outbound_api_key.as_deref(),
        ) {
            if !inbound.is_empty() && inbound == outbound {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "inbound and outbound keys are identical; each direction should use its own secret".into(),
                });
            }
        }

        warnings
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.is_empty())
}
