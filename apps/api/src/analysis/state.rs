//! Shared Analysis State: the single record threaded through the orchestrator and
//! every step.
//!
//! Fields are only ever added or overwritten. Steps never touch the record directly:
//! they return a `StatePatch` and `AnalysisState::merge` applies it.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::action::Action;

/// Requirement/evidence identity is exact equality after this normalization.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Normalizes, drops empties, and deduplicates keeping the first occurrence.
pub fn normalize_all<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| normalize(s.as_ref()))
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Classification
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Met,
    Partial,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrigin {
    ReasoningService,
    SemanticFallback,
}

/// Final verdict for one requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub requirement: String,
    pub status: MatchStatus,
    pub justification: String,
    pub origin: MatchOrigin,
}

/// Gap-engine detail for one requirement, kept for the UI and for auditing thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementScore {
    pub requirement: String,
    pub best_similarity: f64,
    pub threshold: f64,
    pub best_evidence: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Lenient parse of model output; anything unrecognized is Medium.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub skill: String,
    pub priority: Priority,
    pub justification: String,
    pub learning_resources: Vec<String>,
    pub learning_activities: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trace
// ────────────────────────────────────────────────────────────────────────────

/// Compact digest of what the state held when a routing decision was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub has_requirements: bool,
    pub has_evidence: bool,
    pub has_inferred_skills: bool,
    pub has_gap_analysis: bool,
    pub has_evaluation: bool,
    pub has_recommendations: bool,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// 1-based, strictly increasing across the whole session.
    pub step: u32,
    pub chosen_action: Action,
    pub reason: String,
    #[serde(default)]
    pub rejected_actions: BTreeMap<String, String>,
    pub state_snapshot: StateSnapshot,
    pub decided_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// State + patch
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisState {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,

    pub resume_text: String,
    pub jd_text: String,

    pub requirements: Option<Vec<String>>,
    pub evidence: Option<Vec<String>>,
    pub inferred_skills: Option<Vec<String>>,

    pub matched: Option<Vec<String>>,
    pub missing: Option<Vec<String>>,
    pub confidence: Option<f64>,
    pub match_scores: Option<Vec<RequirementScore>>,
    pub embedding_model: Option<String>,

    pub final_evaluation: Option<Vec<MatchResult>>,
    pub recommendations: Option<Vec<Recommendation>>,

    pub chat_question: Option<String>,
    pub chat_answer: Option<String>,
    pub answered_question: Option<String>,

    pub human_question: Option<String>,
    pub human_response: Option<String>,

    pub next_action: Option<Action>,
    pub planner_reason: Option<String>,
    pub rejected_actions: Option<BTreeMap<String, String>>,
    pub last_action: Option<Action>,

    #[serde(default)]
    pub trace: Vec<TraceEntry>,
    #[serde(default)]
    pub done: bool,
}

/// Step output. `Some` overwrites the matching state field, `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub requirements: Option<Vec<String>>,
    pub evidence: Option<Vec<String>>,
    pub inferred_skills: Option<Vec<String>>,
    pub matched: Option<Vec<String>>,
    pub missing: Option<Vec<String>>,
    pub confidence: Option<f64>,
    pub match_scores: Option<Vec<RequirementScore>>,
    pub embedding_model: Option<String>,
    pub final_evaluation: Option<Vec<MatchResult>>,
    pub recommendations: Option<Vec<Recommendation>>,
    pub chat_question: Option<String>,
    pub chat_answer: Option<String>,
    pub answered_question: Option<String>,
    pub human_question: Option<String>,
    pub human_response: Option<String>,
    pub next_action: Option<Action>,
    pub planner_reason: Option<String>,
    pub rejected_actions: Option<BTreeMap<String, String>>,
    pub last_action: Option<Action>,
    pub done: Option<bool>,
}

/// Overwrites `slot` only when the patch carries a value.
fn apply<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl AnalysisState {
    pub fn new(resume_text: impl Into<String>, jd_text: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            resume_text: resume_text.into(),
            jd_text: jd_text.into(),
            requirements: None,
            evidence: None,
            inferred_skills: None,
            matched: None,
            missing: None,
            confidence: None,
            match_scores: None,
            embedding_model: None,
            final_evaluation: None,
            recommendations: None,
            chat_question: None,
            chat_answer: None,
            answered_question: None,
            human_question: None,
            human_response: None,
            next_action: None,
            planner_reason: None,
            rejected_actions: None,
            last_action: None,
            trace: Vec::new(),
            done: false,
        }
    }

    /// The only way step and routing output enters the state. Never deletes a field.
    pub fn merge(&mut self, patch: StatePatch) {
        apply(&mut self.requirements, patch.requirements);
        apply(&mut self.evidence, patch.evidence);
        apply(&mut self.inferred_skills, patch.inferred_skills);
        apply(&mut self.matched, patch.matched);
        apply(&mut self.missing, patch.missing);
        apply(
            &mut self.confidence,
            patch.confidence.map(|c| c.clamp(0.0, 1.0)),
        );
        apply(&mut self.match_scores, patch.match_scores);
        apply(&mut self.embedding_model, patch.embedding_model);
        apply(&mut self.final_evaluation, patch.final_evaluation);
        apply(&mut self.recommendations, patch.recommendations);
        apply(&mut self.chat_question, patch.chat_question);
        apply(&mut self.chat_answer, patch.chat_answer);
        apply(&mut self.answered_question, patch.answered_question);
        apply(&mut self.human_question, patch.human_question);
        apply(&mut self.human_response, patch.human_response);
        apply(&mut self.next_action, patch.next_action);
        apply(&mut self.planner_reason, patch.planner_reason);
        apply(&mut self.rejected_actions, patch.rejected_actions);
        apply(&mut self.last_action, patch.last_action);
        if let Some(done) = patch.done {
            self.done = done;
        }
    }

    /// A chat question exists that the current answer does not cover.
    pub fn has_pending_question(&self) -> bool {
        match self.chat_question.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => self.answered_question.as_deref() != Some(q),
            _ => false,
        }
    }

    pub fn has_gap_analysis(&self) -> bool {
        self.matched.is_some() && self.missing.is_some()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            has_requirements: self.requirements.is_some(),
            has_evidence: self.evidence.is_some(),
            has_inferred_skills: self.inferred_skills.is_some(),
            has_gap_analysis: self.has_gap_analysis(),
            has_evaluation: self.final_evaluation.is_some(),
            has_recommendations: self.recommendations.is_some(),
            confidence: (self.confidence.unwrap_or(0.0) * 100.0).round() / 100.0,
        }
    }

    /// Requirements still unresolved: final MISSING verdicts if classified, else the
    /// gap engine's missing set.
    pub fn unresolved_requirements(&self) -> Option<Vec<String>> {
        match &self.final_evaluation {
            Some(evaluation) => Some(
                evaluation
                    .iter()
                    .filter(|r| r.status == MatchStatus::Missing)
                    .map(|r| r.requirement.clone())
                    .collect(),
            ),
            None => self.missing.clone(),
        }
    }
}
