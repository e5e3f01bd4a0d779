use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use gai_client::RelayClient;
use gai_core::config::Config;
use gai_core::ids::IdGenerator;
use gai_core::inbox::parse_batch;
use gai_core::{Record, RecordKind, RelayStatus};

use crate::output::{finish, print_json, print_table};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum RelaySubcommand {
    /// Send a batch of records to the peer
    Send {
        /// Record kind: fines, impound, cameras, orders
        #[arg(long)]
        kind: RecordKind,
        /// JSON file holding an array of records, or `{"<kind>": [...]}` (`-` for stdin)
        #[arg(long)]
        file: PathBuf,
    },

    /// List what the peer has stored for a kind
    List {
        #[arg(long)]
        kind: RecordKind,
        /// Only records in this relay status (e.g. NEW)
        #[arg(long)]
        status: Option<RelayStatus>,
    },

    /// Check that the peer is reachable and accepts our key
    Check,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config: &Config, subcmd: RelaySubcommand, json: bool) -> anyhow::Result<()> {
    let client = RelayClient::from_config(config).context("cannot reach the peer")?;
    let rt = tokio::runtime::Runtime::new()?;

    match subcmd {
        RelaySubcommand::Send { kind, file } => {
            let payloads = read_payloads(kind, &file)?;
            rt.block_on(send(&client, kind, payloads, json))
        }
        RelaySubcommand::List { kind, status } => {
            let mut result = rt.block_on(client.list_remote(kind));
            if let (Some(status), Some(data)) = (status, result.data.as_mut()) {
                retain_status(kind, data, status);
            }
            finish(&result, json, |data| print_remote(kind, data))
        }
        RelaySubcommand::Check => {
            let result = rt.block_on(client.check_connection());
            finish(&result, json, |_| {})
        }
    }
}

// ---------------------------------------------------------------------------
// send
// ---------------------------------------------------------------------------

async fn send(
    client: &RelayClient,
    kind: RecordKind,
    payloads: Vec<serde_json::Value>,
    json: bool,
) -> anyhow::Result<()> {
    let ids = IdGenerator::new(kind).next_batch(payloads.len(), chrono::Utc::now())?;
    let mut records: Vec<Record> = ids
        .into_iter()
        .zip(payloads)
        .map(|(id, payload)| Record::local(id, kind, payload))
        .collect();

    let result = client.dispatch(kind, &mut records).await;

    if json {
        print_json(&serde_json::json!({
            "result": result,
            "records": records,
        }))?;
    } else {
        if let Some(message) = &result.message {
            println!("{message}");
        }
        let rows = records
            .iter()
            .map(|r| vec![r.id.clone(), r.relay_status.to_string()])
            .collect();
        print_table(&["ID", "STATUS"], rows);
    }

    if !result.success {
        anyhow::bail!(
            "{}",
            result.error.as_deref().unwrap_or(gai_client::error::RELAY_FAILED)
        );
    }
    Ok(())
}

fn read_payloads(kind: RecordKind, file: &Path) -> anyhow::Result<Vec<serde_json::Value>> {
    let bytes = if file == Path::new("-") {
        let mut buf = Vec::new();
        std::io::Read::read_to_end(&mut std::io::stdin(), &mut buf)?;
        buf
    } else {
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?
    };

    if let Ok(serde_json::Value::Array(items)) = serde_json::from_slice(&bytes) {
        return Ok(items);
    }
    Ok(parse_batch(kind, &bytes)?)
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

/// Drop listed records whose `relayStatus` is not `status`; `count` follows.
fn retain_status(kind: RecordKind, data: &mut serde_json::Value, status: RelayStatus) {
    let Some(records) = data.get_mut(kind.as_str()).and_then(|v| v.as_array_mut()) else {
        return;
    };
    records.retain(|r| {
        r.get("relayStatus")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<RelayStatus>().ok())
            == Some(status)
    });
    let count = records.len();
    data["count"] = serde_json::json!(count);
}

fn print_remote(kind: RecordKind, data: &serde_json::Value) {
    let records = data
        .get(kind.as_str())
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    if records.is_empty() {
        println!("No {kind} stored by the peer.");
        return;
    }
    let field = |r: &serde_json::Value, name: &str| {
        r.get(name)
            .and_then(|v| v.as_str())
            .unwrap_or("-")
            .to_string()
    };
    let rows = records
        .iter()
        .map(|r| {
            vec![
                field(r, "id"),
                field(r, "source"),
                field(r, "arrivalTimestamp"),
                field(r, "relayStatus"),
            ]
        })
        .collect();
    print_table(&["ID", "SOURCE", "ARRIVED", "STATUS"], rows);
}
