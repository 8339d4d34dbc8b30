//! # tunnelscope-client
//!
//! HTTP clients used on both sides of the tunnelscope gateway.
//!
//! - [`NgrokClient`] talks to the ngrok API on behalf of the gateway
//! - [`GatewayClient`] talks to the gateway on behalf of end-user tools,
//!   through the [`GatewayApi`] trait so callers can substitute a fake
//!
//! ## Example
//!
//! ```no_run
//! use secrecy::SecretString;
//! use tunnelscope_client::{GatewayApi, GatewayClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let gateway = GatewayClient::new("http://127.0.0.1:3000")?;
//! let api_key = SecretString::new("2abc...".into());
//!
//! gateway.validate_key(&api_key).await?;
//! let tcp_url = gateway.resolve_tcp_url(&api_key).await?;
//! println!("{tcp_url}");
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use secrecy::SecretString;

pub mod error;
pub mod gateway;
pub mod ngrok;

pub use error::ClientError;
pub use gateway::GatewayClient;
pub use ngrok::{NgrokClient, UpstreamConfig};

/// The two operations a gateway offers to end-user tools.
///
/// Implementations must be thread-safe (Send + Sync). Each call is a single
/// round trip with no caching.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Asks the gateway whether `api_key` is accepted upstream.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::GatewayRejected`] with the gateway's message when
    /// the key is missing or rejected, or a transport error when the gateway
    /// cannot be reached.
    async fn validate_key(&self, api_key: &SecretString) -> Result<(), ClientError>;

    /// Asks the gateway for the account's TCP endpoint (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::GatewayRejected`] with the gateway's message when
    /// resolution fails, or a transport error when the gateway cannot be
    /// reached.
    async fn resolve_tcp_url(&self, api_key: &SecretString) -> Result<String, ClientError>;
}
