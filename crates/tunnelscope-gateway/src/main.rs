//! Tunnelscope Gateway
//!
//! HTTP relay that validates ngrok API keys and resolves the account's TCP
//! endpoint on behalf of end-user tools.

use anyhow::Context;
use futures::stream::StreamExt;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::sync::oneshot;
use tracing::{error, info};

use tunnelscope_gateway::{GatewayConfig, GatewayServer};

/// `TUNNELSCOPE_LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` sets the filter.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let format = std::env::var("TUNNELSCOPE_LOG_FORMAT")
        .unwrap_or_else(|_| "pretty".to_string())
        .to_lowercase();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("tunnelscope_gateway=info,tunnelscope_client=info,tower_http=info")
    });

    match format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Resolves once SIGINT or SIGTERM arrives.
fn shutdown_signal() -> anyhow::Result<oneshot::Receiver<()>> {
    let mut signals =
        Signals::new([SIGTERM, SIGINT]).context("Failed to install signal handlers")?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        if let Some(signal) = signals.next().await {
            let name = if signal == SIGTERM { "SIGTERM" } else { "SIGINT" };
            info!("Received {name}, initiating graceful shutdown");
            let _ = shutdown_tx.send(());
        }
    });

    Ok(shutdown_rx)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting tunnelscope gateway");

    let config = match GatewayConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            error!("Expected config at: {:?}", GatewayConfig::config_path());
            return Err(e.into());
        }
    };

    let server = GatewayServer::new(config).context("Failed to initialize gateway")?;
    let shutdown_rx = shutdown_signal()?;

    server
        .run(async move {
            let _ = shutdown_rx.await;
        })
        .await
        .context("Gateway server failed")?;

    info!("Gateway shutdown complete");

    Ok(())
}
