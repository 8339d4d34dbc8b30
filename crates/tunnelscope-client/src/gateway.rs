//! Client for the tunnelscope gateway endpoints.

use async_trait::async_trait;
use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};

use tunnelscope_common::protocol::{RESOLVE_PATH, VALIDATE_PATH};
use tunnelscope_common::{ApiKeyRequest, ErrorBody, ResolveResponse};

use crate::GatewayApi;
use crate::error::ClientError;

/// Message used when a failed validation response carries no `error` field.
pub const VALIDATE_FALLBACK: &str = "Invalid API Key";

/// Message used when a failed resolution response carries no `error` field.
pub const RESOLVE_FALLBACK: &str = "Unknown error occurred";

/// HTTP client for a running gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl GatewayClient {
    /// Creates a client for the gateway at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConfigurationError`] if `base_url` does not
    /// parse.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = reqwest::Url::parse(base_url).map_err(|e| {
            ClientError::ConfigurationError(format!("Invalid gateway URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    /// The gateway root this client talks to.
    #[must_use]
    pub const fn base_url(&self) -> &reqwest::Url {
        &self.base_url
    }

    /// Posts `api_key` to `path` and returns the raw success body.
    async fn post_key(
        &self,
        path: &str,
        api_key: &SecretString,
        fallback: &str,
    ) -> Result<String, ClientError> {
        let url = self.base_url.join(path).map_err(|e| {
            ClientError::ConfigurationError(format!("Invalid gateway path '{path}': {e}"))
        })?;

        debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .json(&ApiKeyRequest::new(api_key.expose_secret()))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| fallback.to_string());

            warn!("Gateway returned {} for {path}: {message}", status.as_u16());

            return Err(ClientError::GatewayRejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl GatewayApi for GatewayClient {
    async fn validate_key(&self, api_key: &SecretString) -> Result<(), ClientError> {
        // Any success status means the key was accepted. The body is not parsed.
        self.post_key(VALIDATE_PATH, api_key, VALIDATE_FALLBACK)
            .await?;
        Ok(())
    }

    async fn resolve_tcp_url(&self, api_key: &SecretString) -> Result<String, ClientError> {
        let text = self
            .post_key(RESOLVE_PATH, api_key, RESOLVE_FALLBACK)
            .await?;
        let response: ResolveResponse = serde_json::from_str(&text)?;

        if response.tcp_url.is_empty() {
            return Err(ClientError::InvalidResponse(
                "gateway returned an empty tcpUrl".to_string(),
            ));
        }

        Ok(response.tcp_url)
    }
}
