//! Decision components: propose the next action from the current state.
//!
//! A strategy only proposes. Validation against the action vocabulary and the
//! HUMAN fallback live in the orchestrator, so every strategy gets the same
//! guarantees.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::analysis::action::Action;
use crate::analysis::prompts::PLANNER_PROMPT;
use crate::analysis::state::AnalysisState;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{parse_json_response, LlmError, ReasoningProvider};

/// Unvalidated decision. `next_action` may name anything at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposedDecision {
    pub next_action: String,
    pub reason: String,
    pub rejected_actions: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("decision provider failed: {0}")]
    Provider(#[from] LlmError),

    #[error("could not serialize state for the decision provider: {0}")]
    Snapshot(serde_json::Error),

    #[error("decision response has no string `next_action`")]
    MissingAction,
}

/// Pluggable decision component. Selected once at startup.
#[async_trait]
pub trait DecisionStrategy: Send + Sync {
    async fn propose(&self, state: &AnalysisState) -> Result<ProposedDecision, PlannerError>;

    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LLM planner
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmDecisionStrategy {
    reasoning: Arc<dyn ReasoningProvider>,
}

impl LlmDecisionStrategy {
    pub fn new(reasoning: Arc<dyn ReasoningProvider>) -> Self {
        Self { reasoning }
    }
}

#[async_trait]
impl DecisionStrategy for LlmDecisionStrategy {
    async fn propose(&self, state: &AnalysisState) -> Result<ProposedDecision, PlannerError> {
        let snapshot = serde_json::to_string_pretty(state).map_err(PlannerError::Snapshot)?;
        let vocabulary = Action::ALL
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        let prompt = PLANNER_PROMPT
            .replace("{actions}", &vocabulary)
            .replace("{state}", &snapshot);

        let text = self.reasoning.complete(&prompt, JSON_ONLY_SYSTEM).await?;
        parse_decision(&parse_json_response(&text)?)
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// Lenient decision parse: only `next_action` is mandatory.
pub fn parse_decision(value: &Value) -> Result<ProposedDecision, PlannerError> {
    let next_action = value
        .get("next_action")
        .and_then(Value::as_str)
        .ok_or(PlannerError::MissingAction)?
        .to_string();
    let reason = value
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let rejected_actions = value
        .get("rejected_actions")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(action, why)| {
                    let why = match why {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (action.clone(), why)
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(ProposedDecision {
        next_action,
        reason,
        rejected_actions,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Rule-table planner
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic planner for offline runs and tests.
///
/// Rules, first match wins:
/// 1. pending chat question → answer-question
/// 2. first missing output: requirements, evidence, inferred skills, gap analysis
/// 3. borderline confidence without a human response → HUMAN
/// 4. no final evaluation → classify-requirements
/// 5. unresolved requirements without recommendations → recommend
/// 6. DONE
#[derive(Debug, Clone, Copy)]
pub struct RuleTableStrategy {
    /// Inclusive confidence band that asks a human before classifying.
    pub borderline: Option<(f64, f64)>,
}

impl Default for RuleTableStrategy {
    fn default() -> Self {
        Self {
            borderline: Some((0.40, 0.60)),
        }
    }
}

impl RuleTableStrategy {
    pub fn without_human_review() -> Self {
        Self { borderline: None }
    }

    fn decide(&self, state: &AnalysisState) -> (Action, String) {
        if state.has_pending_question() {
            return (
                Action::AnswerQuestion,
                "A chat question is waiting for an answer".to_string(),
            );
        }
        if state.requirements.is_none() {
            return (
                Action::ExtractRequirements,
                "Job requirements have not been extracted".to_string(),
            );
        }
        if state.evidence.is_none() {
            return (
                Action::ExtractEvidence,
                "Resume evidence has not been extracted".to_string(),
            );
        }
        if state.inferred_skills.is_none() {
            return (
                Action::InferSkills,
                "Parent skills have not been inferred from evidence".to_string(),
            );
        }
        if !state.has_gap_analysis() {
            return (
                Action::MatchGaps,
                "Requirements have not been matched against evidence".to_string(),
            );
        }

        let confidence = state.confidence.unwrap_or(0.0);
        if let Some((low, high)) = self.borderline {
            let unreviewed = state
                .human_response
                .as_deref()
                .map_or(true, |r| r.trim().is_empty());
            if state.final_evaluation.is_none()
                && unreviewed
                && (low..=high).contains(&confidence)
            {
                return (
                    Action::Human,
                    format!(
                        "Match confidence {:.0}% is borderline; please review the gaps before classification",
                        confidence * 100.0
                    ),
                );
            }
        }

        if state.final_evaluation.is_none() {
            return (
                Action::ClassifyRequirements,
                "Gap analysis exists but requirements are not classified".to_string(),
            );
        }

        let unresolved = state
            .unresolved_requirements()
            .map_or(false, |missing| !missing.is_empty());
        if unresolved && state.recommendations.is_none() {
            return (
                Action::Recommend,
                "Missing requirements need a learning plan".to_string(),
            );
        }

        (
            Action::Done,
            "Gaps identified, classification complete and recommendations present where needed"
                .to_string(),
        )
    }

    fn rejected(state: &AnalysisState, chosen: Action) -> BTreeMap<String, String> {
        let produced = [
            (Action::ExtractRequirements, state.requirements.is_some()),
            (Action::ExtractEvidence, state.evidence.is_some()),
            (Action::InferSkills, state.inferred_skills.is_some()),
            (Action::MatchGaps, state.has_gap_analysis()),
            (Action::ClassifyRequirements, state.final_evaluation.is_some()),
            (Action::Recommend, state.recommendations.is_some()),
        ];
        produced
            .into_iter()
            .filter(|(action, done)| *done && *action != chosen)
            .map(|(action, _)| (action.to_string(), "output already present".to_string()))
            .collect()
    }
}

#[async_trait]
impl DecisionStrategy for RuleTableStrategy {
    async fn propose(&self, state: &AnalysisState) -> Result<ProposedDecision, PlannerError> {
        let (action, reason) = self.decide(state);
        Ok(ProposedDecision {
            next_action: action.to_string(),
            reason,
            rejected_actions: Self::rejected(state, action),
        })
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
