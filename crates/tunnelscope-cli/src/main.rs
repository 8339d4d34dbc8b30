//! Tunnelscope CLI
//!
//! Saves an ngrok API key after checking it with the gateway, and prints the
//! account's TCP endpoint on demand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tunnelscope::{CredentialStore, FileStore, TunnelFetcher};
use tunnelscope_client::GatewayClient;

mod commands;
mod display;

const DEFAULT_GATEWAY: &str = "http://127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(name = "tunnelscope", author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the tunnelscope gateway
    #[arg(long, global = true, env = "TUNNELSCOPE_GATEWAY", default_value = DEFAULT_GATEWAY)]
    gateway: String,

    /// Directory holding the stored API key (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the stored ngrok API key
    #[command(subcommand)]
    Key(KeyCommand),

    /// Print the TCP endpoint of the account's tunnel
    Fetch {
        /// Print only host:port
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Subcommand, Debug)]
enum KeyCommand {
    /// Validate and store an API key
    Save {
        /// The ngrok API key
        #[arg(required_unless_present = "stdin")]
        key: Option<String>,

        /// Read the key from the first line of stdin
        #[arg(long, conflicts_with = "key")]
        stdin: bool,
    },

    /// Delete the stored API key
    Delete,

    /// Show whether an API key is stored
    Status,
}

fn open_storage(data_dir: Option<&PathBuf>) -> Result<FileStore> {
    let storage = match data_dir {
        Some(dir) => FileStore::in_dir(dir),
        None => FileStore::new(),
    };
    storage.context("Failed to open credential storage")
}

async fn run(cli: Cli) -> Result<()> {
    let gateway = GatewayClient::new(&cli.gateway)?;
    let storage = open_storage(cli.data_dir.as_ref())?;
    let store = CredentialStore::mount(gateway.clone(), storage)?;

    match cli.command {
        Command::Key(KeyCommand::Save { key, stdin }) => {
            let key = match key {
                Some(key) if !stdin => key,
                _ => commands::read_key(std::io::stdin().lock())?,
            };
            commands::save_key(store, &key).await
        }
        Command::Key(KeyCommand::Delete) => commands::delete_key(store),
        Command::Key(KeyCommand::Status) => {
            commands::key_status(&store);
            Ok(())
        }
        Command::Fetch { plain } => {
            let mut fetcher = TunnelFetcher::new(gateway);
            commands::fetch_endpoint(&store, &mut fetcher, plain)
                .await
                .map(|_| ())
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        display::display_error(&e.to_string());
        std::process::exit(1);
    }
}
