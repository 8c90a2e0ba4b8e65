//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use dragon_client::{ApiClient, ApiEndpoints, TokenProvider};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::{auth_routes, chat_proxy, health_api};

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub backend_url: String,
    pub secure_cookies: bool,
    pub upstream_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend_url: ApiEndpoints::DEFAULT_BASE.to_string(),
            secure_cookies: false,
            upstream_timeout: Duration::from_secs(30),
        }
    }
}

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    /// Pooled client without a token of its own; handlers attach the caller's.
    pub client: ApiClient,
    pub endpoints: ApiEndpoints,
    pub secure_cookies: bool,
    pub upstream_timeout: Duration,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: ApiClient::new(TokenProvider::anonymous()),
            endpoints: ApiEndpoints::new(&config.backend_url),
            secure_cookies: config.secure_cookies,
            upstream_timeout: config.upstream_timeout,
        }
    }
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/", get(health_api::get_index))
        .route("/api/health", get(health_api::get_health))
        .route("/api/chat", post(chat_proxy::forward_chat))
        .route("/api/auth/login", post(auth_routes::login))
        .route("/api/auth/register", post(auth_routes::register))
        .route("/api/auth/logout", post(auth_routes::logout))
        .with_state(state)
}

/// Starts the gateway and serves until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let backend = state.endpoints.base().to_string();
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind gateway on {addr}"))?;
    info!(%addr, %backend, "Gateway HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("gateway server failed")?;
    Ok(())
}
