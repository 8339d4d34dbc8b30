//! HTTP server wiring.

use std::future::Future;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use tunnelscope_client::NgrokClient;
use tunnelscope_common::protocol::{HEALTH_PATH, RESOLVE_PATH, VALIDATE_PATH};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::handlers::{self, AppState};

/// The gateway HTTP server.
#[derive(Debug)]
pub struct GatewayServer {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Creates a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let ngrok = NgrokClient::new(&config.upstream)
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            config,
            state: AppState { ngrok },
        })
    }

    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Builds the router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route(
                VALIDATE_PATH,
                post(handlers::validate_key).fallback(handlers::method_not_allowed),
            )
            .route(
                RESOLVE_PATH,
                post(handlers::resolve_tcp_url).fallback(handlers::method_not_allowed),
            )
            .route(
                HEALTH_PATH,
                get(handlers::health).fallback(handlers::method_not_allowed),
            )
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors.enabled {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
                .allow_origin(Any);
            router.layer(cors)
        } else {
            router
        }
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        info!(
            addr = %listener.local_addr()?,
            upstream = %self.config.upstream.base_url,
            cors = self.config.cors.enabled,
            "Gateway listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
