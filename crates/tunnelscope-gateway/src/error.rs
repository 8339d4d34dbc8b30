//! Error types for the gateway.
//!
//! Every handler returns `Result<_, GatewayError>`. The [`IntoResponse`]
//! impl turns each failure into a JSON [`ErrorBody`] with the status code the
//! clients expect, so nothing escapes a handler as a bare framework error.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

use tunnelscope_client::ClientError;
use tunnelscope_common::ErrorBody;
use tunnelscope_common::protocol::messages;

/// Which endpoint an upstream failure was seen by.
///
/// The two endpoints report the same upstream failures with different
/// wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Validate,
    Resolve,
}

impl Endpoint {
    /// Prefix placed before the raw upstream body on rejection.
    pub const fn rejected_prefix(self) -> &'static str {
        match self {
            Self::Validate => messages::VALIDATE_REJECTED_PREFIX,
            Self::Resolve => messages::RESOLVE_REJECTED_PREFIX,
        }
    }

    /// Message returned when the upstream could not be reached.
    pub const fn unreachable_message(self) -> &'static str {
        match self {
            Self::Validate => messages::VALIDATE_UNREACHABLE,
            Self::Resolve => messages::RESOLVE_UNREACHABLE,
        }
    }
}

/// Errors that can occur in the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request carried no usable `apiKey`. No upstream call was made.
    #[error("{}", messages::MISSING_CREDENTIAL)]
    MissingCredential,

    /// The upstream answered with a non-success status.
    #[error("{}: {}", .endpoint.rejected_prefix(), .body)]
    UpstreamRejected {
        endpoint: Endpoint,
        status: StatusCode,
        body: String,
    },

    /// The upstream could not be reached, or its success body was unusable.
    #[error("{}", .endpoint.unreachable_message())]
    UpstreamUnreachable {
        endpoint: Endpoint,
        #[source]
        source: ClientError,
    },

    /// The account has no tunnel with protocol `tcp`.
    #[error("{}", messages::NO_TCP_TUNNEL)]
    NoTcpTunnel,

    #[error("{}", messages::METHOD_NOT_ALLOWED)]
    MethodNotAllowed,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error (config file, listener).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `GatewayError`.
pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Classifies a failed upstream call made on behalf of `endpoint`.
    pub fn upstream(endpoint: Endpoint, error: ClientError) -> Self {
        match error {
            ClientError::UpstreamRejected { status, body } => Self::UpstreamRejected {
                endpoint,
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                body,
            },
            source => Self::UpstreamUnreachable { endpoint, source },
        }
    }

    /// HTTP status this error is reported with.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredential => StatusCode::BAD_REQUEST,
            Self::UpstreamRejected { status, .. } => *status,
            Self::NoTcpTunnel => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::UpstreamUnreachable { .. } | Self::Config(_) | Self::Toml(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::UpstreamUnreachable { endpoint, source } => {
                warn!(?endpoint, error = %source, "Upstream unreachable");
            }
            Self::UpstreamRejected {
                endpoint, status, ..
            } => {
                warn!(?endpoint, status = status.as_u16(), "Upstream rejected request");
            }
            _ => {}
        }

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_keeps_upstream_status_and_body() {
        let error = GatewayError::upstream(
            Endpoint::Validate,
            ClientError::UpstreamRejected {
                status: 401,
                body: "unauthorized".to_string(),
            },
        );

        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(error.to_string(), "Invalid Ngrok API key: unauthorized");
    }

    #[test]
    fn test_endpoints_word_rejections_differently() {
        let rejected = |endpoint| {
            GatewayError::upstream(
                endpoint,
                ClientError::UpstreamRejected {
                    status: 403,
                    body: "{}".to_string(),
                },
            )
            .to_string()
        };

        assert_eq!(rejected(Endpoint::Resolve), "Failed to fetch Ngrok tunnels: {}");
        assert_ne!(rejected(Endpoint::Validate), rejected(Endpoint::Resolve));
    }

    #[test]
    fn test_other_client_errors_are_unreachable() {
        let error = GatewayError::upstream(
            Endpoint::Resolve,
            ClientError::InvalidResponse("garbage".to_string()),
        );

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "Failed to fetch Ngrok tunnels");
    }

    #[test]
    fn test_fixed_statuses() {
        assert_eq!(
            GatewayError::MissingCredential.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::NoTcpTunnel.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
