// Skill gap analysis: shared state, orchestrator loop, decision strategies and steps.
// All reasoning calls go through llm_client; all vectors come from embeddings.

pub mod action;
pub mod evaluation;
pub mod gap_matcher;
pub mod handlers;
pub mod orchestrator;
pub mod planner;
pub mod prompts;
pub mod state;
pub mod steps;

#[cfg(test)]
pub mod testing;
