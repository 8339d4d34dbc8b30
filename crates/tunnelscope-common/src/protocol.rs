//! JSON bodies exchanged between the gateway and its clients.
//!
//! Both gateway endpoints accept the same [`ApiKeyRequest`] and answer with
//! either a success body or an [`ErrorBody`]. The user-facing messages live
//! here so the gateway and the client crates cannot drift apart.

use serde::{Deserialize, Serialize};

/// Route of the credential validation endpoint.
pub const VALIDATE_PATH: &str = "/api/validateNgrokKey";

/// Route of the TCP endpoint resolution endpoint.
pub const RESOLVE_PATH: &str = "/api/ngrok";

/// Route of the gateway liveness check.
pub const HEALTH_PATH: &str = "/api/health";

/// Gateway error strings, byte-for-byte as returned in [`ErrorBody::error`].
pub mod messages {
    pub const MISSING_CREDENTIAL: &str = "Ngrok API key is required";
    pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
    pub const KEY_VALID: &str = "API key is valid";
    pub const NO_TCP_TUNNEL: &str = "No TCP tunnel found";

    /// Prefix for upstream rejections seen by the validation endpoint.
    pub const VALIDATE_REJECTED_PREFIX: &str = "Invalid Ngrok API key";
    pub const VALIDATE_UNREACHABLE: &str = "Failed to validate Ngrok API key";

    /// Prefix for upstream rejections seen by the resolution endpoint.
    pub const RESOLVE_REJECTED_PREFIX: &str = "Failed to fetch Ngrok tunnels";
    pub const RESOLVE_UNREACHABLE: &str = "Failed to fetch Ngrok tunnels";
}

/// Request body for both gateway endpoints.
///
/// A missing or empty `apiKey` is a client error, so the field is optional on
/// the wire and checked with [`ApiKeyRequest::api_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRequest {
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ApiKeyRequest {
    /// Creates a request carrying the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    /// Returns the key if present and non-empty.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

/// Success body of the validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub message: String,
}

impl Default for ValidateResponse {
    fn default() -> Self {
        Self {
            message: messages::KEY_VALID.to_string(),
        }
    }
}

/// Success body of the resolution endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// Scheme-stripped `host:port` of the account's TCP tunnel.
    #[serde(rename = "tcpUrl")]
    pub tcp_url: String,
}

/// Error body returned by every failing gateway response.
///
/// Clients must tolerate a missing `error` field, hence the `Option` on the
/// decoding side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
        }
    }
}

/// Body of the liveness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
