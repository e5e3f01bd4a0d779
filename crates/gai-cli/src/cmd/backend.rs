use anyhow::Context;
use clap::Subcommand;
use gai_client::SessionManager;
use gai_core::config::Config;

use crate::output::finish;

#[derive(Subcommand)]
pub enum BackendSubcommand {
    /// Check that the operator back-end answers
    Check,
}

pub fn run(config: &Config, subcmd: BackendSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        BackendSubcommand::Check => {
            let session =
                SessionManager::from_config(config).context("failed to set up back-end session")?;
            session.restore();
            let rt = tokio::runtime::Runtime::new()?;
            let result = rt.block_on(session.check_backend());
            finish(&result, json, |_| {})
        }
    }
}
