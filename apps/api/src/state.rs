use std::sync::Arc;

use crate::analysis::orchestrator::Orchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything behind it is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Owns the decision component and the step services (reasoning, embeddings, skill index).
    pub orchestrator: Arc<Orchestrator>,
}
