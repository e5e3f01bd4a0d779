use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const ACCESS_TOKEN_FILE: &str = "access_token";
pub const REFRESH_TOKEN_FILE: &str = "refresh_token";

/// Access + refresh token pair for one operator session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access: String,
    pub refresh: String,
}

/// Keeps the session's tokens on disk under fixed file names so a session
/// survives between CLI invocations.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    /// The directory is created lazily on the first save.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Both tokens, or `None` if either is missing or empty.
    pub fn load(&self) -> Option<CredentialPair> {
        let access = self.read(ACCESS_TOKEN_FILE)?;
        let refresh = self.read(REFRESH_TOKEN_FILE)?;
        Some(CredentialPair { access, refresh })
    }

    pub fn save(&self, pair: &CredentialPair) -> gai_core::Result<()> {
        self.save_access(&pair.access)?;
        gai_core::io::atomic_write(&self.dir.join(REFRESH_TOKEN_FILE), pair.refresh.as_bytes())
    }

    pub fn save_access(&self, access: &str) -> gai_core::Result<()> {
        gai_core::io::atomic_write(&self.dir.join(ACCESS_TOKEN_FILE), access.as_bytes())
    }

    /// Discard both tokens (no-op if none are stored).
    pub fn clear(&self) -> gai_core::Result<()> {
        gai_core::io::remove_if_exists(&self.dir.join(ACCESS_TOKEN_FILE))?;
        gai_core::io::remove_if_exists(&self.dir.join(REFRESH_TOKEN_FILE))
    }

    fn read(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.dir.join(name))
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }
}
