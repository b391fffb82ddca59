//! Orchestrator: the routing loop.
//!
//! INIT → ROUTING → (RUNNING_STEP → ROUTING)* → PAUSED_FOR_HUMAN | DONE
//!
//! Every step hands control back to routing; there are no step-to-step edges.
//! The state is moved by value through `route` and each step, so exactly one
//! owner mutates it at a time.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::analysis::action::Action;
use crate::analysis::planner::DecisionStrategy;
use crate::analysis::state::{AnalysisState, StatePatch, TraceEntry};
use crate::analysis::steps::{self, PreconditionError, StepContext, StepError};

pub const DEFAULT_MAX_STEPS: usize = 20;

/// A validated routing decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub next_action: Action,
    pub reason: String,
    pub rejected_actions: BTreeMap<String, String>,
}

impl RoutingDecision {
    fn human(reason: String) -> Self {
        Self {
            next_action: Action::Human,
            reason,
            rejected_actions: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    AwaitingHuman,
    StepLimitReached,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub steps_executed: usize,
    pub state: AnalysisState,
}

/// External input that unpauses a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeInput {
    HumanResponse(String),
    ChatQuestion(String),
}

pub struct Orchestrator {
    planner: Arc<dyn DecisionStrategy>,
    steps: StepContext,
    max_steps: usize,
}

impl Orchestrator {
    pub fn new(planner: Arc<dyn DecisionStrategy>, steps: StepContext, max_steps: usize) -> Self {
        Self {
            planner,
            steps,
            max_steps: max_steps.max(1),
        }
    }

    pub fn steps(&self) -> &StepContext {
        &self.steps
    }

    pub fn planner_name(&self) -> &'static str {
        self.planner.name()
    }

    /// Asks the decision component for the next action. Never fails: unparsable
    /// output and out-of-vocabulary actions both become HUMAN with a diagnostic.
    pub async fn decide_next_action(&self, state: &AnalysisState) -> RoutingDecision {
        let proposal = match self.planner.propose(state).await {
            Ok(p) => p,
            Err(e) => {
                warn!("Decision component failed: {e}");
                return RoutingDecision::human(format!("Failed to parse orchestrator output: {e}"));
            }
        };

        match proposal.next_action.parse::<Action>() {
            Ok(next_action) => RoutingDecision {
                next_action,
                reason: proposal.reason,
                rejected_actions: proposal.rejected_actions,
            },
            Err(e) => {
                warn!("{e}");
                RoutingDecision::human(e.to_string())
            }
        }
    }

    /// One routing turn: decide, append to the trace, merge the decision.
    pub async fn route(&self, mut state: AnalysisState) -> AnalysisState {
        let snapshot = state.snapshot();
        let decision = self.decide_next_action(&state).await;
        let step = state.trace.last().map_or(1, |entry| entry.step + 1);

        info!(
            "Step {}: {} ({})",
            step, decision.next_action, decision.reason
        );

        state.trace.push(TraceEntry {
            step,
            chosen_action: decision.next_action,
            reason: decision.reason.clone(),
            rejected_actions: decision.rejected_actions.clone(),
            state_snapshot: snapshot,
            decided_at: Utc::now(),
        });

        let human_question =
            (decision.next_action == Action::Human).then(|| decision.reason.clone());
        state.merge(StatePatch {
            next_action: Some(decision.next_action),
            planner_reason: Some(decision.reason),
            rejected_actions: Some(decision.rejected_actions),
            last_action: Some(decision.next_action),
            human_question,
            done: Some(decision.next_action == Action::Done),
            ..Default::default()
        });
        state
    }

    /// Routes and executes until DONE, HUMAN, or the step cap.
    pub async fn run(&self, mut state: AnalysisState) -> Result<RunReport, PreconditionError> {
        let mut steps_executed = 0;

        for _ in 0..self.max_steps {
            state = self.route(state).await;
            let action = state.next_action.unwrap_or(Action::Human);

            if action.is_control() {
                let status = if action == Action::Done {
                    info!("Session {} completed", state.session_id);
                    RunStatus::Completed
                } else {
                    info!(
                        "Session {} paused for human input: {:?}",
                        state.session_id, state.human_question
                    );
                    RunStatus::AwaitingHuman
                };
                return Ok(RunReport {
                    status,
                    steps_executed,
                    state,
                });
            }

            match steps::execute(action, &state, &self.steps).await {
                Ok(patch) => {
                    state.merge(patch);
                    steps_executed += 1;
                }
                Err(StepError::Precondition(e)) => {
                    error!("Precondition violated in session {}: {e}", state.session_id);
                    return Err(e);
                }
                Err(e @ StepError::Embedding { .. }) => {
                    error!("Session {} paused: {e}", state.session_id);
                    state.merge(StatePatch {
                        human_question: Some(format!(
                            "Embedding service unavailable, retry or review manually: {e}"
                        )),
                        ..Default::default()
                    });
                    return Ok(RunReport {
                        status: RunStatus::AwaitingHuman,
                        steps_executed,
                        state,
                    });
                }
            }
        }

        warn!(
            "Session {} hit the limit of {} routing decisions",
            state.session_id, self.max_steps
        );
        state.merge(StatePatch {
            human_question: Some(format!(
                "Stopped after {} routing decisions without finishing; review the trace and resume",
                self.max_steps
            )),
            ..Default::default()
        });
        Ok(RunReport {
            status: RunStatus::StepLimitReached,
            steps_executed,
            state,
        })
    }

    /// Writes the external input into a paused state and re-enters the loop.
    pub async fn resume(
        &self,
        mut state: AnalysisState,
        input: ResumeInput,
    ) -> Result<RunReport, PreconditionError> {
        let patch = match input {
            ResumeInput::HumanResponse(response) => StatePatch {
                human_response: Some(response),
                ..Default::default()
            },
            ResumeInput::ChatQuestion(question) => StatePatch {
                chat_question: Some(question),
                ..Default::default()
            },
        };
        state.merge(patch);
        self.run(state).await
    }
}
