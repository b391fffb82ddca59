//! Evaluation Merge: reconciles the reasoning service's three-way classification
//! with the gap engine's matched/missing sets.
//!
//! Precedence, by exact requirement string:
//! 1. reasoning "met" always wins
//! 2. reasoning "partially_met" wins unless already met
//! 3. reasoning "missing" applies only if not met/partial
//! 4. everything left is filled from the gap engine: matched → PARTIAL, otherwise → MISSING
//!
//! Labels are compared byte-for-byte. A reasoning label that differs from the
//! extracted requirement only in casing or whitespace does not reconcile; the
//! requirement then falls through to rule 4.
//!
//! A recruiter [`ReviewPolicy`] can be applied to a finished evaluation afterwards
//! to settle PARTIAL verdicts one way or the other.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::analysis::state::{MatchOrigin, MatchResult, MatchStatus};

pub const SEMANTIC_MATCH_JUSTIFICATION: &str = "semantically matched, proficiency unclear";
pub const NO_EVIDENCE_JUSTIFICATION: &str = "no strong evidence found";
pub const PROMOTED_BY_POLICY_JUSTIFICATION: &str = "Promoted by recruiter policy";
pub const DOWNGRADED_BY_POLICY_JUSTIFICATION: &str = "Downgraded by recruiter policy";

/// One requirement judgement as returned by the reasoning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    pub requirement: String,
    pub reason: String,
}

/// The reasoning service's classification. Empty on total service failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningClassification {
    pub met: Vec<Judgement>,
    pub partially_met: Vec<Judgement>,
    pub missing: Vec<Judgement>,
}

impl ReasoningClassification {
    /// Builds a classification from a loosely-shaped JSON object. Missing buckets are
    /// empty; items without a string `requirement` are skipped.
    pub fn from_value(value: &Value) -> Self {
        Self {
            met: judgements(value, "met"),
            partially_met: judgements(value, "partially_met"),
            missing: judgements(value, "missing"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.met.is_empty() && self.partially_met.is_empty() && self.missing.is_empty()
    }
}

fn judgements(value: &Value, bucket: &str) -> Vec<Judgement> {
    value
        .get(bucket)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let requirement = item.get("requirement")?.as_str()?.to_string();
                    let reason = item
                        .get("reason")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    Some(Judgement {
                        requirement,
                        reason,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Produces exactly one verdict per requirement, in requirement order.
pub fn merge_evaluation(
    requirements: &[String],
    reasoning: &ReasoningClassification,
    gap_matched: &[String],
) -> Vec<MatchResult> {
    let known: HashSet<&str> = requirements.iter().map(String::as_str).collect();
    let mut verdicts: HashMap<&str, (MatchStatus, &str)> = HashMap::new();

    let buckets = [
        (MatchStatus::Met, &reasoning.met),
        (MatchStatus::Partial, &reasoning.partially_met),
        (MatchStatus::Missing, &reasoning.missing),
    ];
    // Buckets are visited in precedence order, so first writer wins.
    for (status, items) in buckets {
        for item in items {
            let key = item.requirement.as_str();
            if !known.contains(key) {
                warn!(
                    "Reasoning service classified unknown requirement {:?} as {:?}; ignoring",
                    key, status
                );
                continue;
            }
            verdicts.entry(key).or_insert((status, item.reason.as_str()));
        }
    }

    let matched: HashSet<&str> = gap_matched.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    requirements
        .iter()
        .filter(|r| seen.insert(r.as_str()))
        .map(|requirement| match verdicts.get(requirement.as_str()) {
            Some((status, reason)) => MatchResult {
                requirement: requirement.clone(),
                status: *status,
                justification: reason.to_string(),
                origin: MatchOrigin::ReasoningService,
            },
            None if matched.contains(requirement.as_str()) => MatchResult {
                requirement: requirement.clone(),
                status: MatchStatus::Partial,
                justification: SEMANTIC_MATCH_JUSTIFICATION.to_string(),
                origin: MatchOrigin::SemanticFallback,
            },
            None => MatchResult {
                requirement: requirement.clone(),
                status: MatchStatus::Missing,
                justification: NO_EVIDENCE_JUSTIFICATION.to_string(),
                origin: MatchOrigin::SemanticFallback,
            },
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Recruiter review policy
// ────────────────────────────────────────────────────────────────────────────

/// How a recruiter wants PARTIAL verdicts treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPolicy {
    /// PARTIAL stays PARTIAL.
    #[default]
    Conservative,
    /// PARTIAL becomes MET.
    Trust,
    /// PARTIAL becomes MISSING.
    Strict,
}

/// Rewrites PARTIAL verdicts according to `policy` and returns the weighted overall
/// match: `(met + 0.5 * partial) / total * 100`, truncated, or 0 for an empty
/// evaluation. Order and origins are preserved.
pub fn apply_policy(
    evaluation: &[MatchResult],
    policy: ReviewPolicy,
) -> (Vec<MatchResult>, u32) {
    let reviewed: Vec<MatchResult> = evaluation
        .iter()
        .map(|result| match (result.status, policy) {
            (MatchStatus::Partial, ReviewPolicy::Trust) => MatchResult {
                status: MatchStatus::Met,
                justification: PROMOTED_BY_POLICY_JUSTIFICATION.to_string(),
                ..result.clone()
            },
            (MatchStatus::Partial, ReviewPolicy::Strict) => MatchResult {
                status: MatchStatus::Missing,
                justification: DOWNGRADED_BY_POLICY_JUSTIFICATION.to_string(),
                ..result.clone()
            },
            _ => result.clone(),
        })
        .collect();

    let overall = weighted_match_percentage(&reviewed);
    (reviewed, overall)
}

fn weighted_match_percentage(evaluation: &[MatchResult]) -> u32 {
    if evaluation.is_empty() {
        return 0;
    }
    let count = |status: MatchStatus| evaluation.iter().filter(|r| r.status == status).count();
    // Doubled to keep the half weight in integer arithmetic.
    let points = 2 * count(MatchStatus::Met) + count(MatchStatus::Partial);
    (points * 100 / (2 * evaluation.len())) as u32
}
