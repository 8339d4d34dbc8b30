//! Command implementations for the CLI.

use std::io::BufRead;

use anyhow::{Context, Result, bail};

use tunnelscope::{CredentialStore, KeyValueStore, TunnelFetcher};
use tunnelscope_client::GatewayApi;

use crate::display::{display_endpoint, display_status, display_success};

pub const SAVED: &str = "API Key validated and saved successfully!";
pub const DELETED: &str = "API Key deleted successfully!";

/// Reads a key from the first line of `reader`.
pub fn read_key(reader: impl BufRead) -> Result<String> {
    let line = reader
        .lines()
        .next()
        .transpose()
        .context("Failed to read API key from stdin")?
        .unwrap_or_default();

    let key = line.trim();
    if key.is_empty() {
        bail!("No API key on stdin");
    }
    Ok(key.to_string())
}

/// Validates and stores a new API key.
pub async fn save_key<G, S>(mut store: CredentialStore<G, S>, key: &str) -> Result<()>
where
    G: GatewayApi,
    S: KeyValueStore,
{
    store.save(key).await?;
    display_success(SAVED);
    Ok(())
}

/// Deletes the stored API key.
pub fn delete_key<G, S>(mut store: CredentialStore<G, S>) -> Result<()>
where
    G: GatewayApi,
    S: KeyValueStore,
{
    store.delete()?;
    display_success(DELETED);
    Ok(())
}

/// Shows whether a key is stored.
pub fn key_status<G, S>(store: &CredentialStore<G, S>)
where
    G: GatewayApi,
    S: KeyValueStore,
{
    display_status(store.status(), store.is_input_locked());
}

/// Resolves and prints the TCP endpoint for the stored key.
pub async fn fetch_endpoint<G, S, F>(
    store: &CredentialStore<G, S>,
    fetcher: &mut TunnelFetcher<F>,
    plain: bool,
) -> Result<String>
where
    G: GatewayApi,
    S: KeyValueStore,
    F: GatewayApi,
{
    let endpoint = fetcher.fetch(store.credential()).await?.to_string();
    display_endpoint(&endpoint, plain);
    Ok(endpoint)
}
