//! Router configuration.

use crate::handlers::{check_in, health, tickets, verify};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `GET /health`, `GET /ready`
/// - `POST /api/verify`, `POST /api/verify/manual`
/// - `POST /api/check-in`
/// - `GET /api/owners/:owner/tickets`
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/verify", post(verify::verify))
        .route("/verify/manual", post(verify::verify_manual))
        .route("/check-in", post(check_in::check_in))
        .route("/owners/:owner/tickets", get(tickets::list_owned));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
