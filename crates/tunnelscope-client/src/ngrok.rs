//! Client for the ngrok tunnel API.
//!
//! Both gateway endpoints read the same upstream resource, the account's
//! tunnel list. [`NgrokClient::fetch_tunnels_with`] performs that
//! authenticated read once and hands successful responses to a caller-supplied
//! transformer, so the two call sites share the request and rejection logic.
//!
//! # Security
//!
//! API keys are passed as [`SecretString`] and only exposed while building the
//! `Authorization` header. They are never logged.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use tunnelscope_common::TunnelList;

use crate::error::ClientError;

/// Default ngrok API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.ngrok.com";

/// Default value of the `Ngrok-Version` header.
pub const DEFAULT_API_VERSION: &str = "2";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// Connection settings for the ngrok API.
///
/// ```
/// use tunnelscope_client::UpstreamConfig;
///
/// let config = UpstreamConfig::builder()
///     .base_url("http://127.0.0.1:4040")
///     .timeout_seconds(10)
///     .build();
///
/// assert_eq!(config.api_version, "2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct UpstreamConfig {
    /// API root, without the `/tunnels` path.
    #[serde(default = "default_base_url")]
    #[builder(default = default_base_url(), setter(into))]
    pub base_url: String,

    /// Value sent in the `Ngrok-Version` header.
    #[serde(default = "default_api_version")]
    #[builder(default = default_api_version(), setter(into))]
    pub api_version: String,

    /// Request timeout in seconds.
    ///
    /// `None` means no timeout: a hung upstream blocks the request that is
    /// waiting on it.
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub timeout_seconds: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Client for the ngrok `/tunnels` endpoint.
#[derive(Debug, Clone)]
pub struct NgrokClient {
    client: reqwest::Client,
    tunnels_url: reqwest::Url,
    api_version: String,
}

impl NgrokClient {
    /// Creates a client from upstream settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConfigurationError`] if the base URL does not
    /// parse, or [`ClientError::NetworkError`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientError> {
        let base = config.base_url.trim_end_matches('/');
        let tunnels_url = reqwest::Url::parse(&format!("{base}/tunnels")).map_err(|e| {
            ClientError::ConfigurationError(format!("Invalid base URL '{}': {e}", config.base_url))
        })?;

        let client = match config.timeout_seconds {
            Some(timeout) => reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout))
                .build()?,
            None => reqwest::Client::builder().build()?,
        };

        Ok(Self {
            client,
            tunnels_url,
            api_version: config.api_version.clone(),
        })
    }

    /// The full URL of the tunnel-listing endpoint.
    #[must_use]
    pub const fn tunnels_url(&self) -> &reqwest::Url {
        &self.tunnels_url
    }

    /// Performs the authenticated tunnel-list read.
    ///
    /// On a success status the response is handed to `transform`. On any
    /// other status the raw body is returned in
    /// [`ClientError::UpstreamRejected`] without being parsed.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NetworkError`] if the request cannot be sent or the
    ///   body cannot be read
    /// - [`ClientError::UpstreamRejected`] for non-success statuses
    /// - whatever `transform` returns
    pub async fn fetch_tunnels_with<T, F, Fut>(
        &self,
        api_key: &SecretString,
        transform: F,
    ) -> Result<T, ClientError>
    where
        F: FnOnce(reqwest::Response) -> Fut + Send,
        Fut: Future<Output = Result<T, ClientError>> + Send,
    {
        debug!("GET {}", self.tunnels_url);

        let response = self
            .client
            .get(self.tunnels_url.clone())
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            )
            .header("Ngrok-Version", &self.api_version)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| {
                warn!("Failed to read upstream error body: {e}");
                ClientError::NetworkError(e)
            })?;

            warn!("Upstream rejected tunnel listing with status {}", status.as_u16());

            return Err(ClientError::UpstreamRejected {
                status: status.as_u16(),
                body,
            });
        }

        transform(response).await
    }

    /// Checks that the API key is accepted upstream.
    ///
    /// The success body is not read; validity is the only fact asserted.
    ///
    /// # Errors
    ///
    /// See [`NgrokClient::fetch_tunnels_with`].
    pub async fn validate(&self, api_key: &SecretString) -> Result<(), ClientError> {
        self.fetch_tunnels_with(api_key, |_response| async { Ok(()) })
            .await
    }

    /// Fetches and decodes the account's tunnel list.
    ///
    /// # Errors
    ///
    /// See [`NgrokClient::fetch_tunnels_with`]. A success body that is not a
    /// tunnel list yields [`ClientError::SerializationError`].
    pub async fn list_tunnels(&self, api_key: &SecretString) -> Result<TunnelList, ClientError> {
        self.fetch_tunnels_with(api_key, |response| async move {
            let text = response.text().await?;
            let tunnels: TunnelList = serde_json::from_str(&text)?;
            debug!("Upstream returned {} tunnel(s)", tunnels.tunnels.len());
            Ok(tunnels)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_key() -> SecretString {
        SecretString::new("test-key".into())
    }

    fn create_test_client(base_url: &str) -> NgrokClient {
        let config = UpstreamConfig::builder().base_url(base_url).build();
        NgrokClient::new(&config).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = UpstreamConfig::default();
        assert_eq!(config.base_url, "https://api.ngrok.com");
        assert_eq!(config.api_version, "2");
        assert_eq!(config.timeout_seconds, None);
    }

    #[test]
    fn test_config_from_partial_toml() {
        let config: UpstreamConfig = toml::from_str("timeout_seconds = 5").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_seconds, Some(5));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = UpstreamConfig::builder().base_url("not a url").build();
        let error = NgrokClient::new(&config).unwrap_err();
        assert!(matches!(error, ClientError::ConfigurationError(_)));
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let client = create_test_client("https://api.ngrok.com/");
        assert_eq!(client.tunnels_url().as_str(), "https://api.ngrok.com/tunnels");
    }

    #[tokio::test]
    async fn test_validate_sends_bearer_and_version() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tunnels"))
            .and(header("authorization", "Bearer test-key"))
            .and(header("ngrok-version", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tunnels": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        client.validate(&test_key()).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_ignores_success_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tunnels"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        assert!(client.validate(&test_key()).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejection_keeps_raw_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tunnels"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let error = client.validate(&test_key()).await.unwrap_err();

        match error {
            ClientError::UpstreamRejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_tunnels() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tunnels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tunnels": [
                    { "proto": "https", "public_url": "https://demo.ngrok.app" },
                    { "proto": "tcp", "public_url": "tcp://0.tcp.ngrok.io:12345" }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let tunnels = client.list_tunnels(&test_key()).await.unwrap();

        assert_eq!(tunnels.tunnels.len(), 2);
        assert_eq!(tunnels.tcp_endpoint(), Some("0.tcp.ngrok.io:12345"));
    }

    #[tokio::test]
    async fn test_list_tunnels_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tunnels"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let error = client.list_tunnels(&test_key()).await.unwrap_err();
        assert!(matches!(error, ClientError::SerializationError(_)));
        assert!(error.is_transport());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on port 9 of the loopback interface.
        let client = create_test_client("http://127.0.0.1:9");
        let error = client.validate(&test_key()).await.unwrap_err();
        assert!(matches!(error, ClientError::NetworkError(_)));
    }
}
