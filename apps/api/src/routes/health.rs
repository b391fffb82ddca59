use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and the active planner and embedding model.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let steps = state.orchestrator.steps();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "skillgap-api",
        "planner": state.orchestrator.planner_name(),
        "embedding_model": steps.skill_index.embedding_model(),
    }))
}
