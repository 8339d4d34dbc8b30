//! # tunnelscope
//!
//! Client-side state for looking up the TCP endpoint of an ngrok account.
//!
//! Two pieces cooperate:
//!
//! - [`CredentialStore`] owns the ngrok API key. A candidate key is checked
//!   with the gateway before it is persisted, and a persisted key is trusted
//!   on the next start.
//! - [`TunnelFetcher`] asks the gateway for the account's `host:port` TCP
//!   endpoint using whatever credential the store currently holds.
//!
//! Both talk to the gateway through [`tunnelscope_client::GatewayApi`].
//!
//! ## Example
//!
//! ```no_run
//! use tunnelscope::{CredentialStore, FileStore, TunnelFetcher};
//! use tunnelscope_client::GatewayClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = GatewayClient::new("http://127.0.0.1:3000")?;
//! let mut store = CredentialStore::mount(gateway.clone(), FileStore::new()?)?;
//!
//! store.save("2abc...").await?;
//!
//! let mut fetcher = TunnelFetcher::new(gateway);
//! let endpoint = fetcher.fetch(store.credential()).await?;
//! println!("{endpoint}");
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod storage;

#[cfg(test)]
mod testing;

pub use credentials::{CredentialStatus, CredentialStore};
pub use error::{CoreError, Result};
pub use events::{CredentialCallback, CredentialEvent};
pub use fetcher::TunnelFetcher;
pub use storage::{CREDENTIAL_KEY, FileStore, KeyValueStore, MemoryStore};
