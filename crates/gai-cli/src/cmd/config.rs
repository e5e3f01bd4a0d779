use clap::Subcommand;
use gai_core::config::{Config, WarnLevel};

use crate::output::print_json;

const MASK: &str = "********";

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective config (file + environment), keys masked
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(config: &Config, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(config, json),
        ConfigSubcommand::Validate => validate(config, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn masked(config: &Config) -> Config {
    let mut shown = config.clone();
    for key in [
        &mut shown.peer.inbound_api_key,
        &mut shown.peer.outbound_api_key,
    ] {
        if key.is_some() {
            *key = Some(MASK.to_string());
        }
    }
    shown
}

fn show(config: &Config, json: bool) -> anyhow::Result<()> {
    let shown = masked(config);
    if json {
        print_json(&shown)
    } else {
        print!("{}", serde_yaml::to_string(&shown)?);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config: &Config, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
