pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::careers::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/extract-skills", post(handlers::handle_extract_skills))
        .route("/suggest-career", post(handlers::handle_suggest_career))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
