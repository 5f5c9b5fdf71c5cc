pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/interview/start", post(handlers::handle_start))
        .route("/api/v1/interview/history", get(handlers::handle_history))
        .route("/api/v1/interview/:id", get(handlers::handle_get_interview))
        .route(
            "/api/v1/interview/:id/answer",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interview/:id/complete",
            post(handlers::handle_complete),
        )
        .with_state(state)
}
