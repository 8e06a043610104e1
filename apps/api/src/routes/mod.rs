//! HTTP surface: one router, versioned under /api/v1.

pub mod handlers;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Uploaded résumés are small; anything past this is a mistake, not a résumé.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes/build", post(handlers::handle_build))
        .route("/api/v1/resumes/refine", post(handlers::handle_refine))
        .route("/api/v1/resumes/grade", post(handlers::handle_grade))
        .route("/api/v1/export", post(handlers::handle_export))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
