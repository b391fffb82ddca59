//! Step Executors: one stateless function per action.
//!
//! Contract for every step:
//! 1. check preconditions, failing with `PreconditionError` (a planner bug, never bad data)
//! 2. compute a `StatePatch`
//! 3. the orchestrator merges the patch; steps never mutate state themselves
//!
//! Reasoning-service failures degrade to a fixed fallback at each call site.
//! Embedding failures are reported as `StepError::Embedding`.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::action::Action;
use crate::analysis::evaluation::{merge_evaluation, ReasoningClassification};
use crate::analysis::gap_matcher::GapMatcher;
use crate::analysis::prompts::{
    ANSWER_PROMPT, ANSWER_SYSTEM, CLASSIFY_PROMPT, CLASSIFY_SYSTEM, EXTRACT_EVIDENCE_PROMPT,
    EXTRACT_EVIDENCE_SYSTEM, EXTRACT_REQUIREMENTS_PROMPT, EXTRACT_REQUIREMENTS_SYSTEM,
    RECOMMEND_PROMPT, RECOMMEND_SYSTEM,
};
use crate::analysis::state::{
    normalize_all, AnalysisState, Priority, Recommendation, StatePatch,
};
use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::llm_client::prompts::NO_INFERENCE_INSTRUCTION;
use crate::llm_client::{parse_json_response, ReasoningProvider};
use crate::skills::index::SkillIndex;

/// Role label passed to the recommendation prompt.
const TARGET_ROLE: &str = "Target Role";

/// A step ran without the state fields it needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{action} requires `{field}` in state")]
pub struct PreconditionError {
    pub action: Action,
    pub field: &'static str,
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("{action} failed: {source}")]
    Embedding {
        action: Action,
        #[source]
        source: EmbeddingError,
    },
}

/// Read-only services shared by every step. Built once at startup.
#[derive(Clone)]
pub struct StepContext {
    pub reasoning: Arc<dyn ReasoningProvider>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub skill_index: Arc<SkillIndex>,
    pub gap_matcher: GapMatcher,
}

/// Dispatches `action` to its executor. Control actions have no step.
pub async fn execute(
    action: Action,
    state: &AnalysisState,
    ctx: &StepContext,
) -> Result<StatePatch, StepError> {
    let mut patch = match action {
        Action::ExtractRequirements => extract_requirements(state, ctx).await?,
        Action::ExtractEvidence => extract_evidence(state, ctx).await?,
        Action::InferSkills => infer_skills(state, ctx).await?,
        Action::MatchGaps => match_gaps(state, ctx).await?,
        Action::ClassifyRequirements => classify_requirements(state, ctx).await?,
        Action::Recommend => recommend(state, ctx).await?,
        Action::AnswerQuestion => answer_question(state, ctx).await?,
        Action::Human | Action::Done => StatePatch::default(),
    };
    patch.last_action = Some(action);
    Ok(patch)
}

fn require<'a, T>(
    value: Option<&'a T>,
    action: Action,
    field: &'static str,
) -> Result<&'a T, PreconditionError> {
    value.ok_or(PreconditionError { action, field })
}

fn require_text<'a>(
    text: &'a str,
    action: Action,
    field: &'static str,
) -> Result<&'a str, PreconditionError> {
    if text.trim().is_empty() {
        Err(PreconditionError { action, field })
    } else {
        Ok(text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

pub async fn extract_requirements(
    state: &AnalysisState,
    ctx: &StepContext,
) -> Result<StatePatch, StepError> {
    let jd_text = require_text(&state.jd_text, Action::ExtractRequirements, "jd_text")?;

    let prompt = EXTRACT_REQUIREMENTS_PROMPT
        .replace("{instruction}", NO_INFERENCE_INSTRUCTION)
        .replace("{jd_text}", jd_text);
    let requirements =
        extract_list(ctx, &prompt, EXTRACT_REQUIREMENTS_SYSTEM, "requirements").await;
    info!("Extracted {} requirements", requirements.len());

    Ok(StatePatch {
        requirements: Some(requirements),
        ..Default::default()
    })
}

pub async fn extract_evidence(
    state: &AnalysisState,
    ctx: &StepContext,
) -> Result<StatePatch, StepError> {
    let resume_text = require_text(&state.resume_text, Action::ExtractEvidence, "resume_text")?;

    let prompt = EXTRACT_EVIDENCE_PROMPT
        .replace("{instruction}", NO_INFERENCE_INSTRUCTION)
        .replace("{resume_text}", resume_text);
    let evidence = extract_list(ctx, &prompt, EXTRACT_EVIDENCE_SYSTEM, "evidence").await;
    info!("Extracted {} evidence items", evidence.len());

    Ok(StatePatch {
        evidence: Some(evidence),
        ..Default::default()
    })
}

/// Calls the reasoning service for `{key: [..]}`; any failure yields an empty list.
async fn extract_list(ctx: &StepContext, prompt: &str, system: &str, key: &str) -> Vec<String> {
    let value = match ctx.reasoning.complete(prompt, system).await {
        Ok(text) => parse_json_response(&text),
        Err(e) => Err(e),
    };

    match value {
        Ok(value) => normalize_all(string_items(value.get(key))),
        Err(e) => {
            warn!("Extraction of {key:?} failed, falling back to empty list: {e}");
            Vec::new()
        }
    }
}

/// String entries of a JSON array; anything else is skipped.
fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Semantic steps
// ────────────────────────────────────────────────────────────────────────────

pub async fn infer_skills(
    state: &AnalysisState,
    ctx: &StepContext,
) -> Result<StatePatch, StepError> {
    let evidence = require(state.evidence.as_ref(), Action::InferSkills, "evidence")?;

    let inferred = ctx
        .skill_index
        .infer_parent_skills(evidence, ctx.embedder.as_ref())
        .await
        .map_err(|source| StepError::Embedding {
            action: Action::InferSkills,
            source,
        })?;
    info!("Inferred {} parent skills: {:?}", inferred.len(), inferred);

    Ok(StatePatch {
        inferred_skills: Some(inferred),
        embedding_model: Some(ctx.skill_index.embedding_model().to_string()),
        ..Default::default()
    })
}

pub async fn match_gaps(state: &AnalysisState, ctx: &StepContext) -> Result<StatePatch, StepError> {
    let requirements = require(state.requirements.as_ref(), Action::MatchGaps, "requirements")?;
    let evidence = require(state.evidence.as_ref(), Action::MatchGaps, "evidence")?;
    let inferred = require(
        state.inferred_skills.as_ref(),
        Action::MatchGaps,
        "inferred_skills",
    )?;

    let report = ctx
        .gap_matcher
        .match_requirements(requirements, evidence, inferred, ctx.embedder.as_ref())
        .await
        .map_err(|source| StepError::Embedding {
            action: Action::MatchGaps,
            source,
        })?;

    let confidence = report.confidence();
    Ok(StatePatch {
        matched: Some(report.matched),
        missing: Some(report.missing),
        confidence: Some(confidence),
        match_scores: Some(report.scores),
        embedding_model: Some(
            report
                .embedding_model
                .unwrap_or_else(|| ctx.embedder.model_id().to_string()),
        ),
        ..Default::default()
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Reasoning steps
// ────────────────────────────────────────────────────────────────────────────

pub async fn classify_requirements(
    state: &AnalysisState,
    ctx: &StepContext,
) -> Result<StatePatch, StepError> {
    let action = Action::ClassifyRequirements;
    let requirements = require(state.requirements.as_ref(), action, "requirements")?;
    let resume_text = require_text(&state.resume_text, action, "resume_text")?;
    let matched = require(state.matched.as_ref(), action, "matched")?;
    require(state.missing.as_ref(), action, "missing")?;

    let reasoning = if requirements.is_empty() {
        ReasoningClassification::default()
    } else {
        let block = requirements
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = CLASSIFY_PROMPT
            .replace("{requirements}", &block)
            .replace("{resume_text}", resume_text);

        let value = match ctx.reasoning.complete(&prompt, CLASSIFY_SYSTEM).await {
            Ok(text) => parse_json_response(&text),
            Err(e) => Err(e),
        };
        match value {
            Ok(value) => ReasoningClassification::from_value(&value),
            Err(e) => {
                warn!("Classification failed, falling back to gap engine results: {e}");
                ReasoningClassification::default()
            }
        }
    };

    if reasoning.is_empty() && !requirements.is_empty() {
        info!("No reasoning verdicts; gap engine results fill every requirement");
    }
    let evaluation = merge_evaluation(requirements, &reasoning, matched);
    info!("Classified {} requirements", evaluation.len());

    Ok(StatePatch {
        final_evaluation: Some(evaluation),
        ..Default::default()
    })
}

pub async fn recommend(state: &AnalysisState, ctx: &StepContext) -> Result<StatePatch, StepError> {
    let missing = state.unresolved_requirements().ok_or(PreconditionError {
        action: Action::Recommend,
        field: "missing",
    })?;

    let recommendations = if missing.is_empty() {
        Vec::new()
    } else {
        let prompt = RECOMMEND_PROMPT
            .replace("{role}", TARGET_ROLE)
            .replace("{missing}", &missing.join("\n"));

        let value = match ctx.reasoning.complete(&prompt, RECOMMEND_SYSTEM).await {
            Ok(text) => parse_json_response(&text),
            Err(e) => Err(e),
        };
        match value {
            Ok(value) => parse_recommendations(&value),
            Err(e) => {
                warn!("Recommendation failed, falling back to empty list: {e}");
                Vec::new()
            }
        }
    };
    info!(
        "Produced {} recommendations for {} missing requirements",
        recommendations.len(),
        missing.len()
    );

    Ok(StatePatch {
        recommendations: Some(recommendations),
        ..Default::default()
    })
}

fn parse_recommendations(value: &Value) -> Vec<Recommendation> {
    value
        .get("recommendations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let skill = item.get("skill")?.as_str()?.trim();
                    if skill.is_empty() {
                        return None;
                    }
                    Some(Recommendation {
                        skill: skill.to_string(),
                        priority: item
                            .get("priority")
                            .and_then(Value::as_str)
                            .map(Priority::parse_lenient)
                            .unwrap_or_default(),
                        justification: item
                            .get("justification")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        learning_resources: string_items(item.get("learning_resources")),
                        learning_activities: string_items(item.get("learning_activities")),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

pub async fn answer_question(
    state: &AnalysisState,
    ctx: &StepContext,
) -> Result<StatePatch, StepError> {
    let question = state
        .chat_question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(PreconditionError {
            action: Action::AnswerQuestion,
            field: "chat_question",
        })?;

    let list = |items: Option<&Vec<String>>| {
        items
            .map(|v| format!("{v:?}"))
            .unwrap_or_else(|| "[]".to_string())
    };
    let prompt = ANSWER_PROMPT
        .replace("{requirements}", &list(state.requirements.as_ref()))
        .replace("{evidence}", &list(state.evidence.as_ref()))
        .replace("{matched}", &list(state.matched.as_ref()))
        .replace("{missing}", &list(state.missing.as_ref()))
        .replace(
            "{confidence}",
            &format!("{:.0}", state.confidence.unwrap_or(0.0) * 100.0),
        )
        .replace("{question}", question);

    let answer = match ctx.reasoning.complete(&prompt, ANSWER_SYSTEM).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => "Unable to answer the question right now: empty response.".to_string(),
        Err(e) => {
            warn!("Answer generation failed: {e}");
            format!("Unable to answer the question right now: {e}")
        }
    };

    Ok(StatePatch {
        chat_answer: Some(answer),
        answered_question: Some(question.to_string()),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::evaluation::{NO_EVIDENCE_JUSTIFICATION, SEMANTIC_MATCH_JUSTIFICATION};
    use crate::analysis::state::{MatchOrigin, MatchStatus};
    use crate::analysis::testing::{step_context, unit_vector_at, ScriptedReasoner, StaticEmbedder};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn gap_ready_state() -> AnalysisState {
        let mut state = AnalysisState::new("Resume: SQL reporting", "JD: SQL, forklift");
        state.requirements = Some(strings(&["sql", "forklift certification"]));
        state.evidence = Some(strings(&["sql queries for reporting"]));
        state.inferred_skills = Some(vec![]);
        state.matched = Some(strings(&["sql"]));
        state.missing = Some(strings(&["forklift certification"]));
        state.confidence = Some(0.5);
        state
    }

    #[tokio::test]
    async fn test_extract_requirements_normalizes_and_dedupes() {
        let reasoner = ScriptedReasoner::new().respond(
            EXTRACT_REQUIREMENTS_SYSTEM,
            r#"```json
{"requirements": ["  SQL ", "sql", 42, "Forklift certification"]}
```"#,
        );
        let ctx = step_context(reasoner, StaticEmbedder::new(vec![])).await;
        let state = AnalysisState::new("resume", "JD text");

        let patch = execute(Action::ExtractRequirements, &state, &ctx).await.unwrap();
        assert_eq!(
            patch.requirements,
            Some(strings(&["sql", "forklift certification"]))
        );
        assert_eq!(patch.last_action, Some(Action::ExtractRequirements));
    }

    #[tokio::test]
    async fn test_extract_requirements_garbage_yields_empty_list() {
        let reasoner = ScriptedReasoner::new().respond(EXTRACT_REQUIREMENTS_SYSTEM, "I cannot");
        let ctx = step_context(reasoner, StaticEmbedder::new(vec![])).await;

        let patch = extract_requirements(&AnalysisState::new("r", "jd"), &ctx)
            .await
            .unwrap();
        assert_eq!(patch.requirements, Some(vec![]));
    }

    #[tokio::test]
    async fn test_extract_evidence_service_failure_yields_empty_list() {
        let reasoner = ScriptedReasoner::new().fail(EXTRACT_EVIDENCE_SYSTEM);
        let ctx = step_context(reasoner, StaticEmbedder::new(vec![])).await;

        let patch = extract_evidence(&AnalysisState::new("resume", "jd"), &ctx)
            .await
            .unwrap();
        assert_eq!(patch.evidence, Some(vec![]));
    }

    #[tokio::test]
    async fn test_missing_jd_text_is_precondition_error() {
        let ctx = step_context(ScriptedReasoner::new(), StaticEmbedder::new(vec![])).await;
        let err = execute(
            Action::ExtractRequirements,
            &AnalysisState::new("resume", "   "),
            &ctx,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            StepError::Precondition(PreconditionError {
                action: Action::ExtractRequirements,
                field: "jd_text"
            })
        ));
    }

    #[tokio::test]
    async fn test_match_gaps_requires_inferred_skills() {
        let ctx = step_context(ScriptedReasoner::new(), StaticEmbedder::new(vec![])).await;
        let mut state = AnalysisState::new("resume", "jd");
        state.requirements = Some(strings(&["sql"]));
        state.evidence = Some(strings(&["sql"]));

        let err = match_gaps(&state, &ctx).await.unwrap_err();
        assert!(matches!(
            err,
            StepError::Precondition(PreconditionError {
                field: "inferred_skills",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_match_gaps_records_confidence_and_model() {
        let embedder = StaticEmbedder::new(vec![
            ("sql", unit_vector_at(0, 2)),
            ("kaizen", unit_vector_at(1, 2)),
            ("sql reporting", unit_vector_at(0, 2)),
        ]);
        let ctx = step_context(ScriptedReasoner::new(), embedder).await;
        let mut state = AnalysisState::new("resume", "jd");
        state.requirements = Some(strings(&["sql", "kaizen"]));
        state.evidence = Some(strings(&["sql reporting"]));
        state.inferred_skills = Some(vec![]);

        let patch = match_gaps(&state, &ctx).await.unwrap();
        assert_eq!(patch.matched, Some(strings(&["sql"])));
        assert_eq!(patch.missing, Some(strings(&["kaizen"])));
        assert_eq!(patch.confidence, Some(0.5));
        assert_eq!(patch.embedding_model.as_deref(), Some("static-test"));
    }

    #[tokio::test]
    async fn test_match_gaps_embedding_failure_is_step_error() {
        let ctx = step_context(ScriptedReasoner::new(), StaticEmbedder::new(vec![])).await;
        let mut state = AnalysisState::new("resume", "jd");
        state.requirements = Some(strings(&["sql"]));
        state.evidence = Some(strings(&["sql"]));
        state.inferred_skills = Some(vec![]);

        let err = match_gaps(&state, &ctx).await.unwrap_err();
        assert!(matches!(
            err,
            StepError::Embedding {
                action: Action::MatchGaps,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_classify_garbage_falls_back_to_gap_engine() {
        let reasoner = ScriptedReasoner::new().respond(CLASSIFY_SYSTEM, "<<<not json>>>");
        let ctx = step_context(reasoner, StaticEmbedder::new(vec![])).await;

        let patch = classify_requirements(&gap_ready_state(), &ctx).await.unwrap();
        let evaluation = patch.final_evaluation.unwrap();

        assert_eq!(evaluation.len(), 2);
        assert_eq!(evaluation[0].requirement, "sql");
        assert_eq!(evaluation[0].status, MatchStatus::Partial);
        assert_eq!(evaluation[0].justification, SEMANTIC_MATCH_JUSTIFICATION);
        assert_eq!(evaluation[1].status, MatchStatus::Missing);
        assert_eq!(evaluation[1].justification, NO_EVIDENCE_JUSTIFICATION);
        assert!(evaluation
            .iter()
            .all(|r| r.origin == MatchOrigin::SemanticFallback));
    }

    #[tokio::test]
    async fn test_classify_service_error_falls_back_to_gap_engine() {
        let reasoner = ScriptedReasoner::new().fail(CLASSIFY_SYSTEM);
        let ctx = step_context(reasoner, StaticEmbedder::new(vec![])).await;

        let patch = classify_requirements(&gap_ready_state(), &ctx).await.unwrap();
        assert_eq!(patch.final_evaluation.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_classify_uses_reasoning_verdicts() {
        let reasoner = ScriptedReasoner::new().respond(
            CLASSIFY_SYSTEM,
            r#"{"met": [{"requirement": "sql", "reason": "daily reporting in SQL"}],
                "partially_met": [],
                "missing": [{"requirement": "forklift certification", "reason": "not mentioned"}]}"#,
        );
        let ctx = step_context(reasoner, StaticEmbedder::new(vec![])).await;

        let evaluation = classify_requirements(&gap_ready_state(), &ctx)
            .await
            .unwrap()
            .final_evaluation
            .unwrap();
        assert_eq!(evaluation[0].status, MatchStatus::Met);
        assert_eq!(evaluation[0].justification, "daily reporting in SQL");
        assert_eq!(evaluation[1].justification, "not mentioned");
    }

    #[tokio::test]
    async fn test_classify_requires_gap_results() {
        let ctx = step_context(ScriptedReasoner::new(), StaticEmbedder::new(vec![])).await;
        let mut state = AnalysisState::new("resume", "jd");
        state.requirements = Some(strings(&["sql"]));

        let err = classify_requirements(&state, &ctx).await.unwrap_err();
        assert!(matches!(
            err,
            StepError::Precondition(PreconditionError { field: "matched", .. })
        ));
    }

    #[tokio::test]
    async fn test_classify_without_requirements_skips_service() {
        let reasoner = Arc::new(ScriptedReasoner::new());
        let ctx = step_context(reasoner.clone(), StaticEmbedder::new(vec![])).await;
        let mut state = AnalysisState::new("resume", "jd");
        state.requirements = Some(vec![]);
        state.matched = Some(vec![]);
        state.missing = Some(vec![]);

        let patch = classify_requirements(&state, &ctx).await.unwrap();
        assert_eq!(patch.final_evaluation, Some(vec![]));
        assert_eq!(reasoner.call_count(CLASSIFY_SYSTEM), 0);
    }

    #[tokio::test]
    async fn test_recommend_skips_malformed_items() {
        let reasoner = ScriptedReasoner::new().respond(
            RECOMMEND_SYSTEM,
            r#"{"recommendations": [
                {"skill": "Forklift certification", "priority": "high",
                 "justification": "Required daily",
                 "learning_resources": ["OSHA course"], "learning_activities": ["Supervised hours", 7]},
                {"priority": "Low"},
                {"skill": "Kaizen"}
            ]}"#,
        );
        let ctx = step_context(reasoner, StaticEmbedder::new(vec![])).await;

        let recs = recommend(&gap_ready_state(), &ctx)
            .await
            .unwrap()
            .recommendations
            .unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].learning_activities, strings(&["Supervised hours"]));
        assert_eq!(recs[1].skill, "Kaizen");
        assert_eq!(recs[1].priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_recommend_with_nothing_missing_skips_service() {
        let reasoner = Arc::new(ScriptedReasoner::new());
        let ctx = step_context(reasoner.clone(), StaticEmbedder::new(vec![])).await;
        let mut state = gap_ready_state();
        state.missing = Some(vec![]);

        let patch = recommend(&state, &ctx).await.unwrap();
        assert_eq!(patch.recommendations, Some(vec![]));
        assert_eq!(reasoner.call_count(RECOMMEND_SYSTEM), 0);
    }

    #[tokio::test]
    async fn test_recommend_requires_missing_set() {
        let ctx = step_context(ScriptedReasoner::new(), StaticEmbedder::new(vec![])).await;
        let err = recommend(&AnalysisState::new("resume", "jd"), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StepError::Precondition(PreconditionError { field: "missing", .. })
        ));
    }

    #[tokio::test]
    async fn test_answer_question_records_answered_question() {
        let reasoner =
            ScriptedReasoner::new().respond(ANSWER_SYSTEM, "  Borderline: forklift certification missing. ");
        let ctx = step_context(reasoner, StaticEmbedder::new(vec![])).await;
        let mut state = gap_ready_state();
        state.chat_question = Some(" Is the candidate suitable? ".to_string());

        let patch = answer_question(&state, &ctx).await.unwrap();
        assert_eq!(
            patch.chat_answer.as_deref(),
            Some("Borderline: forklift certification missing.")
        );
        assert_eq!(
            patch.answered_question.as_deref(),
            Some("Is the candidate suitable?")
        );
    }

    #[tokio::test]
    async fn test_answer_question_failure_returns_fallback_note() {
        let reasoner = ScriptedReasoner::new().fail(ANSWER_SYSTEM);
        let ctx = step_context(reasoner, StaticEmbedder::new(vec![])).await;
        let mut state = gap_ready_state();
        state.chat_question = Some("Is the candidate suitable?".to_string());

        let patch = answer_question(&state, &ctx).await.unwrap();
        assert!(patch
            .chat_answer
            .unwrap()
            .starts_with("Unable to answer the question right now"));
    }

    #[tokio::test]
    async fn test_answer_question_requires_question() {
        let ctx = step_context(ScriptedReasoner::new(), StaticEmbedder::new(vec![])).await;
        let err = answer_question(&gap_ready_state(), &ctx).await.unwrap_err();
        assert!(matches!(
            err,
            StepError::Precondition(PreconditionError {
                field: "chat_question",
                ..
            })
        ));
    }
}
