pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::draw::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/draw",
            get(handlers::handle_get_draw).post(handlers::handle_run_draw),
        )
        .route("/api/v1/draw/reset", post(handlers::handle_reset_draw))
        .route(
            "/api/v1/draw/exclusions",
            get(handlers::handle_get_exclusions),
        )
        .route(
            "/api/v1/draw/participants",
            get(handlers::handle_list_participants),
        )
        .with_state(state)
}
