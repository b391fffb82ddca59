//! Deterministic stand-ins for the external services, shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::analysis::gap_matcher::GapMatcher;
use crate::analysis::planner::{DecisionStrategy, PlannerError, ProposedDecision};
use crate::analysis::state::AnalysisState;
use crate::analysis::steps::StepContext;
use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::llm_client::{LlmError, ReasoningProvider};
use crate::skills::index::SkillIndex;
use crate::skills::ontology::SkillOntology;

/// Unit vector along axis `i`.
pub fn unit_vector_at(i: usize, dim: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[i] = 1.0;
    v
}

/// Embedder with a fixed text → vector table. Unknown text is an error.
pub struct StaticEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl StaticEmbedder {
    pub fn new(entries: Vec<(&str, Vec<f32>)>) -> Self {
        Self {
            vectors: entries
                .into_iter()
                .map(|(text, v)| (text.to_string(), v))
                .collect(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .cloned()
                    .ok_or_else(|| EmbeddingError::UnknownText(t.clone()))
            })
            .collect()
    }

    fn model_id(&self) -> &str {
        "static-test"
    }
}

/// Reasoning service keyed by system prompt. Unscripted prompts fail like an outage.
#[derive(Default)]
pub struct ScriptedReasoner {
    responses: HashMap<String, Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, system: &str, text: &str) -> Self {
        self.responses
            .insert(system.to_string(), Some(text.to_string()));
        self
    }

    pub fn fail(mut self, system: &str) -> Self {
        self.responses.insert(system.to_string(), None);
        self
    }

    pub fn call_count(&self, system: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.as_str() == system)
            .count()
    }
}

#[async_trait]
impl ReasoningProvider for ScriptedReasoner {
    async fn complete(&self, _prompt: &str, system: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(system.to_string());
        match self.responses.get(system) {
            Some(Some(text)) => Ok(text.clone()),
            _ => Err(LlmError::Api {
                status: 503,
                message: "scripted outage".to_string(),
            }),
        }
    }
}

/// Planner that replays a fixed queue of proposals, then keeps answering DONE.
pub struct ScriptedPlanner {
    queue: Mutex<VecDeque<Result<ProposedDecision, PlannerError>>>,
}

impl ScriptedPlanner {
    pub fn new(proposals: Vec<Result<ProposedDecision, PlannerError>>) -> Self {
        Self {
            queue: Mutex::new(proposals.into()),
        }
    }

    /// Proposals naming each action in turn, with a canned reason.
    pub fn actions(actions: &[&str]) -> Self {
        Self::new(actions.iter().map(|a| Ok(proposal(a))).collect())
    }
}

pub fn proposal(action: &str) -> ProposedDecision {
    ProposedDecision {
        next_action: action.to_string(),
        reason: format!("scripted {action}"),
        rejected_actions: Default::default(),
    }
}

#[async_trait]
impl DecisionStrategy for ScriptedPlanner {
    async fn propose(&self, _state: &AnalysisState) -> Result<ProposedDecision, PlannerError> {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(proposal("DONE")))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Step context over an empty ontology, so inference always yields nothing.
pub async fn step_context(
    reasoning: impl Into<Arc<ScriptedReasoner>>,
    embedder: StaticEmbedder,
) -> StepContext {
    step_context_with_ontology(reasoning, embedder, SkillOntology::new(Default::default())).await
}

pub async fn step_context_with_ontology(
    reasoning: impl Into<Arc<ScriptedReasoner>>,
    embedder: StaticEmbedder,
    ontology: SkillOntology,
) -> StepContext {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);
    let skill_index = SkillIndex::build(Arc::new(ontology), embedder.as_ref())
        .await
        .expect("skill index over test ontology");
    let reasoning: Arc<ScriptedReasoner> = reasoning.into();

    StepContext {
        reasoning,
        embedder,
        skill_index: Arc::new(skill_index),
        gap_matcher: GapMatcher::default(),
    }
}
