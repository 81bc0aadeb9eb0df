// src/routes.rs

use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;

use crate::{handlers::export, state::AppState};

/// Assembles the main application router.
pub fn create_router(state: AppState) -> Router {
    let export_routes = Router::new().route(
        "/users/{user_id}/completed-tests",
        post(export::export_completed_tests),
    );

    Router::new()
        .nest("/api/exports", export_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
