//! Web server for the portal.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::auth::{
    start_session_sweeper, verifier_from_config, CredentialVerifier, SessionPolicy,
};
use crate::config::Config;
use crate::{Database, PortalError, Result};

use super::handlers::AppState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
    /// Interval between background sweeps.
    sweep_interval_secs: u64,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: Database) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                PortalError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    config.server.host, config.server.port
                ))
            })?;

        let app_state = AppState::new(db)
            .with_policy(SessionPolicy::from(&config.sessions))
            .with_verifier(verifier_from_config(&config.auth)?)
            .with_retention_days(config.sessions.retention_days);

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins: config.server.cors_origins.clone(),
            sweep_interval_secs: config.sessions.sweep_interval_secs,
        })
    }

    /// Use a custom credential verifier for logins.
    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let state = (*self.app_state).clone().with_verifier(verifier);
        self.app_state = Arc::new(state);
        self
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the full router over this server's state.
    pub fn router(&self) -> Router {
        create_router(self.app_state.clone(), &self.cors_origins).merge(create_health_router())
    }

    /// Bind, start the session sweeper and build the router.
    async fn prepare(self) -> std::result::Result<(TcpListener, Router), std::io::Error> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        // Start the sweeper after a successful bind
        start_session_sweeper(
            self.app_state.db.clone(),
            self.app_state.policy,
            self.sweep_interval_secs,
        );

        tracing::info!("Web server listening on http://{}", local_addr);
        Ok((listener, router))
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let (listener, router) = self.prepare().await?;
        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let (listener, router) = self.prepare().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
