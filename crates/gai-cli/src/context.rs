use std::path::{Path, PathBuf};

use anyhow::Context;
use gai_core::config::{Config, DEFAULT_CONFIG_FILE};

/// Directory for session tokens when `backend.token_dir` is unset.
pub const DEFAULT_TOKEN_DIR: &str = ".gai";

/// Resolve the config file path.
///
/// Priority:
/// 1. `--config` flag / `GAI_CONFIG` env var (passed in as `explicit`)
/// 2. `gai.yaml` in the current directory
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Load the config (defaults when the file is missing), apply `GAI_*`
/// environment overrides and fill in the token directory.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let mut config = Config::load_or_default(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    config.apply_overrides(|name| std::env::var(name).ok());
    if config.backend.token_dir.is_none() {
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.backend.token_dir = Some(base.join(DEFAULT_TOKEN_DIR));
    }
    Ok(config)
}
