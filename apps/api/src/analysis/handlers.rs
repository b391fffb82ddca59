//! Axum route handlers for the Analysis API.
//!
//! Sessions are not stored server-side: every response carries the full state and
//! the caller sends it back to resume.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::evaluation::{apply_policy, ReviewPolicy};
use crate::analysis::gap_matcher::GapReport;
use crate::analysis::orchestrator::{ResumeInput, RunReport};
use crate::analysis::state::{AnalysisState, MatchResult};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartAnalysisRequest {
    pub resume_text: String,
    pub jd_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ResumeAnalysisRequest {
    pub state: AnalysisState,
    pub human_response: Option<String>,
    pub chat_question: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GapMatchRequest {
    pub requirements: Vec<String>,
    pub evidence: Vec<String>,
    #[serde(default)]
    pub inferred_skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct InferSkillsRequest {
    pub evidence: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InferSkillsResponse {
    pub inferred_skills: Vec<String>,
    pub embedding_model: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewEvaluationRequest {
    pub evaluation: Vec<MatchResult>,
    #[serde(default)]
    pub policy: ReviewPolicy,
}

#[derive(Debug, Serialize)]
pub struct ReviewEvaluationResponse {
    pub policy: ReviewPolicy,
    pub evaluation: Vec<MatchResult>,
    pub overall_match: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyses
///
/// Starts a session and runs it until DONE, a HUMAN pause, or the step cap.
pub async fn handle_start_analysis(
    State(state): State<AppState>,
    Json(request): Json<StartAnalysisRequest>,
) -> Result<Json<RunReport>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    let session = AnalysisState::new(request.resume_text, request.jd_text);
    let report = state.orchestrator.run(session).await?;

    Ok(Json(report))
}

/// POST /api/v1/analyses/resume
///
/// Continues a paused or finished session with exactly one of
/// `human_response` or `chat_question`.
pub async fn handle_resume_analysis(
    State(state): State<AppState>,
    Json(request): Json<ResumeAnalysisRequest>,
) -> Result<Json<RunReport>, AppError> {
    let human_response = non_blank(request.human_response);
    let chat_question = non_blank(request.chat_question);

    let input = match (human_response, chat_question) {
        (Some(response), None) => ResumeInput::HumanResponse(response),
        (None, Some(question)) => ResumeInput::ChatQuestion(question),
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "provide either human_response or chat_question, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(AppError::Validation(
                "one of human_response or chat_question is required".to_string(),
            ))
        }
    };

    let report = state.orchestrator.resume(request.state, input).await?;

    Ok(Json(report))
}

/// POST /api/v1/gap-match
///
/// Direct access to the gap matching engine, bypassing the orchestrator.
pub async fn handle_gap_match(
    State(state): State<AppState>,
    Json(request): Json<GapMatchRequest>,
) -> Result<Json<GapReport>, AppError> {
    let steps = state.orchestrator.steps();
    let report = steps
        .gap_matcher
        .match_requirements(
            &request.requirements,
            &request.evidence,
            &request.inferred_skills,
            steps.embedder.as_ref(),
        )
        .await?;

    Ok(Json(report))
}

/// POST /api/v1/skills/infer
pub async fn handle_infer_skills(
    State(state): State<AppState>,
    Json(request): Json<InferSkillsRequest>,
) -> Result<Json<InferSkillsResponse>, AppError> {
    let steps = state.orchestrator.steps();
    let inferred_skills = steps
        .skill_index
        .infer_parent_skills(&request.evidence, steps.embedder.as_ref())
        .await?;

    Ok(Json(InferSkillsResponse {
        inferred_skills,
        embedding_model: steps.skill_index.embedding_model().to_string(),
    }))
}

/// POST /api/v1/evaluations/review
///
/// Applies a recruiter policy to a final evaluation. Pure, no provider calls.
pub async fn handle_review_evaluation(
    Json(request): Json<ReviewEvaluationRequest>,
) -> Json<ReviewEvaluationResponse> {
    let (evaluation, overall_match) = apply_policy(&request.evaluation, request.policy);

    Json(ReviewEvaluationResponse {
        policy: request.policy,
        evaluation,
        overall_match,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
