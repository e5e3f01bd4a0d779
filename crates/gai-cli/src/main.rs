mod cmd;
mod context;
mod output;

use clap::{Parser, Subcommand};
use cmd::{backend::BackendSubcommand, config::ConfigSubcommand, relay::RelaySubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gai",
    about = "GAI back-office relay: exchange fines, impound, camera and order records with the peer system",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./gai.yaml)
    #[arg(long, global = true, env = "GAI_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay receiver
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (overrides server.port; 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Send records to, or inspect, the peer's relay
    Relay {
        #[command(subcommand)]
        subcommand: RelaySubcommand,
    },

    /// Log in to the operator back-end
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "GAI_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Discard the stored session tokens
    Logout,

    /// Show the logged-in operator
    Whoami,

    /// Operator back-end diagnostics
    Backend {
        #[command(subcommand)]
        subcommand: BackendSubcommand,
    },

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = context::resolve_config_path(cli.config.as_deref());

    let result = context::load_config(&config_path).and_then(|config| match cli.command {
        Commands::Serve { bind, port } => cmd::serve::run(config, bind, port),
        Commands::Relay { subcommand } => cmd::relay::run(&config, subcommand, cli.json),
        Commands::Login { email, password } => {
            cmd::session::login(&config, &email, &password, cli.json)
        }
        Commands::Logout => cmd::session::logout(&config, cli.json),
        Commands::Whoami => cmd::session::whoami(&config, cli.json),
        Commands::Backend { subcommand } => cmd::backend::run(&config, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&config, subcommand, cli.json),
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
