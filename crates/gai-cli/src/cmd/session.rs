use anyhow::Context;
use gai_client::{ClientError, SessionManager, SessionState};
use gai_core::config::Config;

use crate::output::{finish, print_json};

fn manager(config: &Config) -> anyhow::Result<SessionManager> {
    SessionManager::from_config(config).context("failed to set up back-end session")
}

// ---------------------------------------------------------------------------
// login / logout
// ---------------------------------------------------------------------------

pub fn login(config: &Config, email: &str, password: &str, json: bool) -> anyhow::Result<()> {
    let session = manager(config)?;
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(session.login(email, password));
    let summary = result.map(|login| login.user);
    finish(&summary, json, |user| {
        println!("Logged in as {} ({})", user.email, user.role);
    })
}

pub fn logout(config: &Config, json: bool) -> anyhow::Result<()> {
    let session = manager(config)?;
    session.logout();
    if json {
        print_json(&serde_json::json!({ "success": true }))?;
    } else {
        println!("Logged out.");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// whoami
// ---------------------------------------------------------------------------

pub fn whoami(config: &Config, json: bool) -> anyhow::Result<()> {
    let session = manager(config)?;
    if session.restore() != SessionState::Authenticated {
        return Err(ClientError::NotAuthenticated.into());
    }
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(session.current_user());
    if session.state() == SessionState::Expired {
        let cause = result.error.unwrap_or_default();
        return Err(anyhow::anyhow!(cause).context(ClientError::SessionExpired));
    }
    finish(&result, json, |user| {
        println!("{} <{}>", user.name, user.email);
        println!("role:       {}", user.role);
        if !user.department.is_empty() {
            println!("department: {}", user.department);
        }
    })
}
