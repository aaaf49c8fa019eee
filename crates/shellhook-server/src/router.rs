//! Router assembly for the shellhook HTTP API.
//!
//! [`build_router`] wires the hook, health and metrics handlers with a
//! tracing middleware layer.

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router.
///
/// TraceLayer provides request-level logging via tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/hook", get(handlers::hook::run_hook))
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::metrics::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
