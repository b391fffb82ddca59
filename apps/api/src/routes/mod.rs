pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis sessions
        .route("/api/v1/analyses", post(handlers::handle_start_analysis))
        .route(
            "/api/v1/analyses/resume",
            post(handlers::handle_resume_analysis),
        )
        // Direct engine access
        .route("/api/v1/gap-match", post(handlers::handle_gap_match))
        .route("/api/v1/skills/infer", post(handlers::handle_infer_skills))
        // Recruiter review
        .route(
            "/api/v1/evaluations/review",
            post(handlers::handle_review_evaluation),
        )
        .with_state(state)
}
