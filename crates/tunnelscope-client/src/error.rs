//! Error types for the client library.

use thiserror::Error;

/// Errors that can occur when talking to the ngrok API or to the gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Network or HTTP request failure.
    ///
    /// DNS resolution, refused connections, timeouts and unreadable bodies
    /// all end up here.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Client configuration issue, such as an unparsable base URL.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The ngrok API answered with a non-success status.
    ///
    /// `body` is the raw response text, never reinterpreted.
    #[error("Upstream rejected request ({status}): {body}")]
    UpstreamRejected {
        /// HTTP status returned by the upstream service.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The gateway answered with a non-success status.
    ///
    /// `message` is the gateway's `error` field, or a fallback when the body
    /// carried none.
    #[error("{message}")]
    GatewayRejected {
        /// HTTP status returned by the gateway.
        status: u16,
        /// Human-readable error message.
        message: String,
    },

    /// The response decoded but did not have the expected content.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Whether the failure happened below HTTP semantics (no usable response).
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::SerializationError(_))
    }

    /// The HTTP status of a rejection, if this error carries one.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamRejected { status, .. } | Self::GatewayRejected { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_carry_status() {
        let upstream = ClientError::UpstreamRejected {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(upstream.status(), Some(401));
        assert!(!upstream.is_transport());

        let gateway = ClientError::GatewayRejected {
            status: 404,
            message: "No TCP tunnel found".to_string(),
        };
        assert_eq!(gateway.status(), Some(404));
        assert_eq!(gateway.to_string(), "No TCP tunnel found");
    }

    #[test]
    fn test_configuration_error_is_not_transport() {
        let error = ClientError::ConfigurationError("bad url".to_string());
        assert!(!error.is_transport());
        assert_eq!(error.status(), None);
    }
}
