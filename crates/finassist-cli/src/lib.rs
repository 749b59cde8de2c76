//! Finassist command-line interface.

pub mod chat;
pub mod serve;

use clap::{Parser, Subcommand};
use finassist_core::Config;

/// Finassist - financial assistant chat backend
#[derive(Parser)]
#[command(name = "finassist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP/WebSocket server
    Serve {
        /// Bind address override
        #[arg(long)]
        bind: Option<String>,

        /// Port override
        #[arg(long)]
        port: Option<u16>,
    },

    /// Chat with the assistant from the terminal
    Chat {
        /// Index the configured documents folder before chatting
        #[arg(long)]
        index: bool,
    },

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { bind, port } => {
            let mut config = load_config()?;
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve::run(config).await
        }
        Commands::Chat { index } => chat::run(load_config()?, index).await,
        Commands::Version => {
            println!("finassist {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load `.env` and then the process configuration.
fn load_config() -> anyhow::Result<Config> {
    finassist_core::env::load_dotenv()?;
    Ok(Config::from_env()?)
}
