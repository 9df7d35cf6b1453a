pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/interviews/start", post(handlers::handle_start))
        .route(
            "/api/v1/interviews/continue",
            post(handlers::handle_continue),
        )
        .with_state(state)
}
