//! On-demand retrieval of the account's TCP endpoint.
//!
//! Each [`TunnelFetcher::fetch`] is a single round trip through the gateway.
//! Nothing is cached between calls and nothing is retried.

use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};

use tunnelscope_client::GatewayApi;

use crate::credentials::describe_gateway_error;
use crate::error::{CoreError, Result};

/// Shown when the gateway cannot be reached during resolution.
pub const RESOLVE_UNREACHABLE: &str = "Failed to fetch TCP URL";

/// Fetches and holds the most recently resolved TCP endpoint.
///
/// At most one of `endpoint` and `error` describes the last attempt: a
/// successful fetch clears the error, a gateway failure clears the endpoint.
#[derive(Debug)]
pub struct TunnelFetcher<G> {
    gateway: G,
    endpoint: Option<String>,
    error: Option<String>,
}

impl<G: GatewayApi> TunnelFetcher<G> {
    pub const fn new(gateway: G) -> Self {
        Self {
            gateway,
            endpoint: None,
            error: None,
        }
    }

    /// Resolves the endpoint with `credential`.
    ///
    /// Without a credential (or with an empty one) no request is sent; the
    /// error is set to the prompt message and any previous endpoint is kept.
    ///
    /// # Errors
    ///
    /// - [`CoreError::CredentialRequired`] if there is nothing to send
    /// - [`CoreError::Gateway`] with the gateway's message, or
    ///   [`RESOLVE_UNREACHABLE`] if the gateway could not be reached
    pub async fn fetch(&mut self, credential: Option<&SecretString>) -> Result<&str> {
        let Some(api_key) = credential.filter(|key| !key.expose_secret().is_empty()) else {
            debug!("Fetch requested without a credential");
            self.error = Some(CoreError::CredentialRequired.to_string());
            return Err(CoreError::CredentialRequired);
        };

        self.error = None;

        match self.gateway.resolve_tcp_url(api_key).await {
            Ok(endpoint) => {
                debug!("Resolved TCP endpoint {endpoint}");
                Ok(self.endpoint.insert(endpoint).as_str())
            }
            Err(e) => {
                warn!("TCP endpoint resolution failed: {e}");
                let message = describe_gateway_error(&e, RESOLVE_UNREACHABLE);
                self.endpoint = None;
                self.error = Some(message.clone());
                Err(CoreError::Gateway(message))
            }
        }
    }

    /// The endpoint from the last successful fetch.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// The message of the last failed fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether an endpoint is available for display.
    pub const fn is_ready(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Ends a display cycle, dropping both endpoint and error.
    pub fn clear(&mut self) {
        self.endpoint = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::testing::{FakeGateway, Reply};

    fn key(value: &str) -> SecretString {
        SecretString::new(value.into())
    }

    #[tokio::test]
    async fn test_fetch_without_credential_sends_nothing() {
        let gateway = FakeGateway::default();
        let mut fetcher = TunnelFetcher::new(gateway.clone());

        let error = fetcher.fetch(None).await.unwrap_err();

        assert!(matches!(error, CoreError::CredentialRequired));
        assert_eq!(
            fetcher.error(),
            Some("Please enter your Ngrok API Key first.")
        );
        assert_eq!(gateway.resolve_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_with_empty_credential_sends_nothing() {
        let gateway = FakeGateway::default();
        let mut fetcher = TunnelFetcher::new(gateway.clone());

        let empty = key("");
        assert!(matches!(
            fetcher.fetch(Some(&empty)).await,
            Err(CoreError::CredentialRequired)
        ));
        assert_eq!(gateway.resolve_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let gateway = FakeGateway::default();
        let mut fetcher = TunnelFetcher::new(gateway.clone());

        let endpoint = fetcher.fetch(Some(&key("k"))).await.unwrap();

        assert_eq!(endpoint, "0.tcp.ngrok.io:12345");
        assert_eq!(fetcher.endpoint(), Some("0.tcp.ngrok.io:12345"));
        assert!(fetcher.error().is_none());
        assert!(fetcher.is_ready());
        assert_eq!(gateway.resolve_calls(), 1);
    }

    #[tokio::test]
    async fn test_each_fetch_is_a_fresh_request() {
        let gateway = FakeGateway::default();
        let mut fetcher = TunnelFetcher::new(gateway.clone());
        let api_key = key("k");

        fetcher.fetch(Some(&api_key)).await.unwrap();
        gateway.set_resolve(Reply::Ok("4.tcp.ngrok.io:20000".to_string()));
        fetcher.fetch(Some(&api_key)).await.unwrap();

        assert_eq!(fetcher.endpoint(), Some("4.tcp.ngrok.io:20000"));
        assert_eq!(gateway.resolve_calls(), 2);
    }

    #[tokio::test]
    async fn test_gateway_message_is_shown_verbatim() {
        let gateway = FakeGateway::default()
            .with_resolve(Reply::Rejected(404, "No TCP tunnel found".to_string()));
        let mut fetcher = TunnelFetcher::new(gateway);

        let error = fetcher.fetch(Some(&key("k"))).await.unwrap_err();

        assert_eq!(error.to_string(), "No TCP tunnel found");
        assert_eq!(fetcher.error(), Some("No TCP tunnel found"));
        assert!(fetcher.endpoint().is_none());
    }

    #[tokio::test]
    async fn test_failure_clears_previous_endpoint() {
        let gateway = FakeGateway::default();
        let mut fetcher = TunnelFetcher::new(gateway.clone());
        let api_key = key("k");

        fetcher.fetch(Some(&api_key)).await.unwrap();
        gateway.set_resolve(Reply::Unreachable);
        fetcher.fetch(Some(&api_key)).await.unwrap_err();

        assert!(fetcher.endpoint().is_none());
        assert!(!fetcher.is_ready());
        assert_eq!(fetcher.error(), Some(RESOLVE_UNREACHABLE));
    }

    #[tokio::test]
    async fn test_missing_credential_keeps_previous_endpoint() {
        let mut fetcher = TunnelFetcher::new(FakeGateway::default());

        fetcher.fetch(Some(&key("k"))).await.unwrap();
        fetcher.fetch(None).await.unwrap_err();

        assert_eq!(fetcher.endpoint(), Some("0.tcp.ngrok.io:12345"));
        assert!(fetcher.error().is_some());
    }

    #[tokio::test]
    async fn test_clear_resets_display() {
        let mut fetcher = TunnelFetcher::new(FakeGateway::default());

        fetcher.fetch(Some(&key("k"))).await.unwrap();
        fetcher.clear();

        assert!(fetcher.endpoint().is_none());
        assert!(fetcher.error().is_none());
    }
}
