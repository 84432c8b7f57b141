//! HTTP API Server
//!
//! Starts and manages the axum-based JSON-RPC host.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use sg_core::{ApiConfig, SessionContexts, ToolManager};

use crate::card::AgentCard;
use crate::error::{ApiError, Result};
use crate::middleware::auth::BearerAuth;
use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub tools: Arc<ToolManager>,
    pub contexts: Arc<SessionContexts>,
    pub card: Arc<AgentCard>,
}

impl AppState {
    pub fn new(tools: ToolManager, contexts: Arc<SessionContexts>, config: &ApiConfig) -> Self {
        let auth_enabled = BearerAuth::new(config.bearer_token.as_deref()).is_enabled();
        let card = AgentCard::new(config.public_url(), &tools, auth_enabled);
        Self {
            tools: Arc::new(tools),
            contexts,
            card: Arc::new(card),
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState, config: &ApiConfig) -> Router {
    let auth = BearerAuth::new(config.bearer_token.as_deref());
    if !auth.is_enabled() {
        warn!("A2A_BEARER_TOKEN is not set; /jsonrpc accepts unauthenticated requests");
    }

    Router::new()
        .merge(routes(auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP API server and run until `shutdown` resolves
pub async fn start_server<F>(config: &ApiConfig, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state, config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ApiError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("HTTP API listening on {}", addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    info!("HTTP API stopped");
    Ok(())
}
