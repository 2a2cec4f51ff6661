pub mod health;
pub mod info;
pub mod rank;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(info::info_handler))
        .route("/api/", get(info::info_handler))
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::health_handler))
        .route("/api/categories", get(info::categories_handler))
        // Both paths serve the configured scoring mode
        .route("/rank_resumes", post(rank::handle_rank))
        .route("/api/classify", post(rank::handle_rank))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
