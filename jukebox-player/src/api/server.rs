//! HTTP server setup and routing
//!
//! Sets up the Axum router for the session command endpoints, reaction
//! intake and the SSE event stream.

use crate::error::{Error, Result};
use crate::jukebox::Jukebox;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub jukebox: Jukebox,
}

/// Build the router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let sessions = Router::new()
        .route("/:session_id/play", post(super::handlers::play))
        .route("/:session_id/volume", post(super::handlers::set_volume))
        .route("/:session_id/skip", post(super::handlers::skip))
        .route("/:session_id/pause", post(super::handlers::pause))
        .route("/:session_id/resume", post(super::handlers::resume))
        .route("/:session_id/stop", post(super::handlers::stop))
        .route("/:session_id/queue", get(super::handlers::get_queue))
        .route("/:session_id/state", get(super::handlers::get_state));

    Router::new()
        // Health endpoint (no prefix)
        .route("/health", get(super::handlers::health))
        .nest(
            "/api/v1",
            Router::new()
                .nest("/sessions", sessions)
                .route("/reactions", post(super::handlers::post_reaction))
                .route("/events", get(super::sse::event_stream)),
        )
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// Run HTTP API server until `shutdown` resolves
pub async fn run(
    addr: SocketAddr,
    jukebox: Jukebox,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_router(AppContext { jukebox });

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}
