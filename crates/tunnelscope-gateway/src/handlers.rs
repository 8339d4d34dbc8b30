//! Endpoint handlers.
//!
//! Request bodies are read as raw bytes and decoded leniently: a missing,
//! malformed or key-less body is a missing credential (400), never an axum
//! extractor rejection.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use secrecy::SecretString;
use tracing::{debug, info};

use tunnelscope_client::NgrokClient;
use tunnelscope_common::protocol::messages;
use tunnelscope_common::{ApiKeyRequest, HealthResponse, ResolveResponse, ValidateResponse};

use crate::error::{Endpoint, GatewayError, Result};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub ngrok: NgrokClient,
}

fn extract_api_key(body: &[u8]) -> Result<SecretString> {
    let request: ApiKeyRequest = serde_json::from_slice(body).unwrap_or_default();

    let api_key = request.api_key().ok_or(GatewayError::MissingCredential)?;
    debug!(key_len = api_key.len(), "Received API key");

    Ok(SecretString::new(api_key.into()))
}

/// `POST /api/validateNgrokKey`
pub async fn validate_key(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ValidateResponse>> {
    let api_key = extract_api_key(&body)?;

    state
        .ngrok
        .validate(&api_key)
        .await
        .map_err(|e| GatewayError::upstream(Endpoint::Validate, e))?;

    info!("API key accepted upstream");
    Ok(Json(ValidateResponse {
        message: messages::KEY_VALID.to_string(),
    }))
}

/// `POST /api/ngrok`
pub async fn resolve_tcp_url(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ResolveResponse>> {
    let api_key = extract_api_key(&body)?;

    let tunnels = state
        .ngrok
        .list_tunnels(&api_key)
        .await
        .map_err(|e| GatewayError::upstream(Endpoint::Resolve, e))?;

    let tcp_url = tunnels
        .tcp_endpoint()
        .ok_or(GatewayError::NoTcpTunnel)?
        .to_string();

    info!(tunnels = tunnels.tunnels.len(), %tcp_url, "Resolved TCP endpoint");
    Ok(Json(ResolveResponse { tcp_url }))
}

/// `GET /api/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Answers any verb a route does not serve.
pub async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}
