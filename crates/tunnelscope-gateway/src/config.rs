//! Gateway configuration.
//!
//! Configuration is loaded from `~/.config/tunnelscope/gateway.toml`. The file
//! is optional; every field has a default.
//!
//! ## Example Configuration
//!
//! ```toml
//! bind_addr = "0.0.0.0:3000"
//!
//! [upstream]
//! base_url = "https://api.ngrok.com"
//! api_version = "2"
//! timeout_seconds = 10
//!
//! [cors]
//! enabled = true
//! ```
//!
//! `TUNNELSCOPE_BIND` and `TUNNELSCOPE_UPSTREAM_URL` override `bind_addr` and
//! `upstream.base_url` respectively.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tunnelscope_client::UpstreamConfig;

use crate::error::{GatewayError, Result};

/// Environment variable overriding [`GatewayConfig::bind_addr`].
pub const BIND_ENV: &str = "TUNNELSCOPE_BIND";

/// Environment variable overriding the upstream base URL.
pub const UPSTREAM_URL_ENV: &str = "TUNNELSCOPE_UPSTREAM_URL";

/// Gateway configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (default: 127.0.0.1:3000)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// ngrok API connection settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub cors: CorsConfig,
}

/// Cross-origin settings for browser front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Whether to answer CORS preflights (default: true)
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            upstream: UpstreamConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

const fn default_cors_enabled() -> bool {
    true
}

impl GatewayConfig {
    /// Loads configuration from the default location and applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config directory cannot be determined
    /// - The file exists but cannot be read or parsed
    /// - An override or the resulting configuration is invalid
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(
            std::env::var(BIND_ENV).ok().as_deref(),
            std::env::var(UPSTREAM_URL_ENV).ok().as_deref(),
        )?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {e}")))?;

        Ok(toml::from_str(&contents)?)
    }

    /// Returns the default configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GatewayError::Config("Failed to determine config directory".to_string()))?
            .join("tunnelscope");

        Ok(config_dir.join("gateway.toml"))
    }

    /// Applies override values, usually taken from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `bind` is not a socket address.
    pub fn apply_overrides(&mut self, bind: Option<&str>, upstream_url: Option<&str>) -> Result<()> {
        if let Some(bind) = bind {
            self.bind_addr = bind.parse().map_err(|e| {
                GatewayError::Config(format!("Invalid {BIND_ENV} value '{bind}': {e}"))
            })?;
        }

        if let Some(url) = upstream_url {
            self.upstream.base_url = url.to_string();
        }

        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The upstream base URL is not an absolute http(s) URL
    /// - The API version is empty
    /// - The timeout is zero
    pub fn validate(&self) -> Result<()> {
        let base_url = &self.upstream.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GatewayError::Config(format!(
                "Upstream base URL must be http(s): '{base_url}'"
            )));
        }

        if self.upstream.api_version.trim().is_empty() {
            return Err(GatewayError::Config(
                "Upstream API version must not be empty".to_string(),
            ));
        }

        if self.upstream.timeout_seconds == Some(0) {
            return Err(GatewayError::Config(
                "Upstream timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}
