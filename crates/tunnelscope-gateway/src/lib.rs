//! # tunnelscope-gateway
//!
//! Server-side relay between end-user tools and the ngrok API.
//!
//! Exposes two POST endpoints:
//!
//! - `/api/validateNgrokKey` checks that an API key is accepted upstream
//! - `/api/ngrok` resolves the account's TCP tunnel to `host:port`
//!
//! The gateway holds no state between requests. The API key arrives in each
//! request body and is forwarded as a bearer token.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;

pub use config::GatewayConfig;
pub use error::{Endpoint, GatewayError, Result};
pub use server::GatewayServer;
