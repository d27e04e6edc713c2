//! HTTP server setup and routing

use crate::error::{Error, Result};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Search (content-negotiated: JSON, SSE, plain text)
        .route("/search", get(super::handlers::search))
        // Bang table and autocomplete
        .route("/bangs", get(super::handlers::list_bangs))
        .route("/bangs/suggest", get(super::handlers::suggest_bangs))
        .route("/suggest", get(super::handlers::suggest_terms))
        // Source registry
        .route("/engines", get(super::handlers::list_engines))
        .route("/engines/:name", get(super::handlers::engine_detail))
        // Service endpoints
        .route("/health", get(super::handlers::health))
        .route("/status", get(super::handlers::status))
        .route("/config/reload", post(super::handlers::reload_config))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP API server until the provided shutdown future resolves.
pub async fn run(
    state: AppState,
    bind_addr: &str,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("HTTP server listening on {}", bind_addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(e.to_string()))?;

    Ok(())
}
