//! # tunnelscope-common
//!
//! Types shared by the tunnelscope gateway and its clients.
//!
//! - Upstream tunnel records and the TCP endpoint selection rule
//! - JSON request/response bodies of the gateway endpoints
//!
//! ## Example
//!
//! ```
//! use tunnelscope_common::{TunnelList, TunnelRecord};
//!
//! let list = TunnelList {
//!     tunnels: vec![
//!         TunnelRecord::new("https", "https://demo.ngrok.app"),
//!         TunnelRecord::new("tcp", "tcp://0.tcp.ngrok.io:12345"),
//!     ],
//! };
//!
//! assert_eq!(list.tcp_endpoint(), Some("0.tcp.ngrok.io:12345"));
//! ```

/// Gateway request/response bodies, routes and error strings.
pub mod protocol;
/// Upstream tunnel list decoding and TCP endpoint selection.
pub mod tunnel;

pub use protocol::{ApiKeyRequest, ErrorBody, HealthResponse, ResolveResponse, ValidateResponse};
pub use tunnel::{TunnelList, TunnelRecord};
