//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Mount the dispatcher as the service behind an Axum router
//! - Wire up transport-level layers (tracing, request timeout)
//! - Bind server to listener
//! - Stop accepting and drain on shutdown

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::lifecycle::Shutdown;
use crate::routing::Dispatcher;

/// HTTP server fronting a [`Dispatcher`].
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `dispatcher`.
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        let router = Self::build_router(&config, dispatcher);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, dispatcher: Dispatcher) -> Router {
        Router::new()
            .fallback_service(dispatcher)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let stopped = shutdown.notified();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                stopped.await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
