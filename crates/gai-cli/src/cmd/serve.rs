use anyhow::Context;
use gai_core::config::Config;

pub fn run(mut config: Config, bind: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config
        .require_inbound_key()
        .context("cannot start relay receiver")?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        println!(
            "{} relay receiver on {}:{}  (peer: {})",
            config.system_name, config.server.bind, config.server.port, config.peer.name
        );

        tokio::select! {
            res = gai_server::serve(&config) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down relay receiver");
                Ok(())
            }
        }
    })
}
