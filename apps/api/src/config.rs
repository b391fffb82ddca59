use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::analysis::orchestrator::DEFAULT_MAX_STEPS;

/// Which decision component drives the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerKind {
    Llm,
    Rules,
}

impl FromStr for PlannerKind {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "llm" => Ok(PlannerKind::Llm),
            "rules" => Ok(PlannerKind::Rules),
            other => bail!("PLANNER must be 'llm' or 'rules', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub skill_ontology_path: PathBuf,
    /// OpenAI-compatible embeddings endpoint. Unset means the offline hashing embedder.
    pub embedding_api_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub max_orchestration_steps: usize,
    pub planner: PlannerKind,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            skill_ontology_path: optional_env("SKILL_ONTOLOGY_PATH")
                .unwrap_or_else(|| "data/skill_ontology.json".to_string())
                .into(),
            embedding_api_url: optional_env("EMBEDDING_API_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| "all-MiniLM-L6-v2".to_string()),
            max_orchestration_steps: match optional_env("MAX_ORCHESTRATION_STEPS") {
                Some(raw) => parse_step_limit(&raw)?,
                None => DEFAULT_MAX_STEPS,
            },
            planner: optional_env("PLANNER")
                .unwrap_or_else(|| "llm".to_string())
                .parse()?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_step_limit(raw: &str) -> Result<usize> {
    let limit = raw
        .trim()
        .parse::<usize>()
        .context("MAX_ORCHESTRATION_STEPS must be a positive integer")?;
    if limit == 0 {
        bail!("MAX_ORCHESTRATION_STEPS must be at least 1");
    }
    Ok(limit)
}
