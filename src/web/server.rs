//! Web server for filevault.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::{ServerConfig, StorageConfig};
use crate::{Result, VaultError};

use super::handlers::AppState;
use super::router::create_router_with_limit;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
    /// Request body limit in bytes.
    body_limit: usize,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(server: &ServerConfig, storage: &StorageConfig, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| VaultError::Config(format!("invalid server address: {e}")))?;

        let body_limit = usize::try_from(storage.max_upload_size_mb.saturating_mul(1024 * 1024))
            .unwrap_or(usize::MAX);

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins: server.cors_origins.clone(),
            body_limit,
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn router(&self) -> Router {
        create_router_with_limit(self.app_state.clone(), &self.cors_origins, self.body_limit)
            .layer(CompressionLayer::new())
    }

    /// Run the web server until `shutdown` completes, then drain in-flight
    /// requests.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Web server stopped");
        Ok(())
    }

    /// Run the web server until Ctrl-C.
    pub async fn run(self) -> std::io::Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
        })
        .await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
