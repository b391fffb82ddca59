mod analysis;
mod config;
mod embeddings;
mod errors;
mod llm_client;
mod routes;
mod skills;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::analysis::gap_matcher::GapMatcher;
use crate::analysis::orchestrator::Orchestrator;
use crate::analysis::planner::{DecisionStrategy, LlmDecisionStrategy, RuleTableStrategy};
use crate::analysis::steps::StepContext;
use crate::config::{Config, PlannerKind};
use crate::embeddings::{EmbeddingProvider, HashingEmbedder, HttpEmbeddingClient};
use crate::llm_client::{LlmClient, ReasoningProvider};
use crate::routes::build_router;
use crate::skills::index::SkillIndex;
use crate::skills::ontology::SkillOntology;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skill Gap API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let reasoning: Arc<dyn ReasoningProvider> =
        Arc::new(LlmClient::new(config.anthropic_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize embedding provider (HTTP endpoint if configured, offline hashing otherwise)
    let embedder: Arc<dyn EmbeddingProvider> = match &config.embedding_api_url {
        Some(url) => Arc::new(HttpEmbeddingClient::new(
            url.clone(),
            config.embedding_api_key.clone(),
            config.embedding_model.clone(),
        )?),
        None => Arc::new(HashingEmbedder::default()),
    };
    info!("Embedding provider initialized (model: {})", embedder.model_id());

    // Load the skill ontology and embed every label once
    let ontology = SkillOntology::load(&config.skill_ontology_path).with_context(|| {
        format!(
            "Failed to load skill ontology from {}",
            config.skill_ontology_path.display()
        )
    })?;
    let skill_index = SkillIndex::build(Arc::new(ontology), embedder.as_ref())
        .await
        .context("Failed to build skill index")?;

    // Initialize decision component
    let planner: Arc<dyn DecisionStrategy> = match config.planner {
        PlannerKind::Llm => Arc::new(LlmDecisionStrategy::new(reasoning.clone())),
        PlannerKind::Rules => Arc::new(RuleTableStrategy::default()),
    };
    info!(
        "Planner: {} (max {} routing decisions per run)",
        planner.name(),
        config.max_orchestration_steps
    );

    let steps = StepContext {
        reasoning,
        embedder,
        skill_index: Arc::new(skill_index),
        gap_matcher: GapMatcher::default(),
    };

    // Build app state
    let state = AppState {
        orchestrator: Arc::new(Orchestrator::new(
            planner,
            steps,
            config.max_orchestration_steps,
        )),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once a frontend origin is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
