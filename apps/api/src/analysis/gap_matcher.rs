//! Gap Matching Engine: semantic requirement vs evidence matching.
//!
//! Algorithm:
//! 1. Normalize requirements and evidence (lowercase, trim)
//! 2. Extend evidence with inferred parent skills, deduplicate
//! 3. Embed both sides in one batch each
//! 4. Per requirement: max cosine similarity over all evidence
//! 5. Matched when max ≥ effective threshold (base, minus a bonus for ≤3-token requirements)
//! 6. match_percentage = floor(100 × matched / total)

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::state::{normalize_all, RequirementScore};
use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::skills::vector::cosine_similarity;

pub const BASE_THRESHOLD: f64 = 0.65;
pub const SHORT_REQUIREMENT_DISCOUNT: f64 = 0.05;
pub const SHORT_REQUIREMENT_MAX_TOKENS: usize = 3;

/// Output of one matching pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub match_percentage: u32,
    pub scores: Vec<RequirementScore>,
    /// None when no embedding call was needed (empty inputs).
    pub embedding_model: Option<String>,
}

impl GapReport {
    fn empty() -> Self {
        Self {
            matched: Vec::new(),
            missing: Vec::new(),
            match_percentage: 0,
            scores: Vec::new(),
            embedding_model: None,
        }
    }

    pub fn confidence(&self) -> f64 {
        f64::from(self.match_percentage) / 100.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GapMatcher {
    pub base_threshold: f64,
    pub short_requirement_discount: f64,
    pub short_requirement_max_tokens: usize,
}

impl Default for GapMatcher {
    fn default() -> Self {
        Self {
            base_threshold: BASE_THRESHOLD,
            short_requirement_discount: SHORT_REQUIREMENT_DISCOUNT,
            short_requirement_max_tokens: SHORT_REQUIREMENT_MAX_TOKENS,
        }
    }
}

impl GapMatcher {
    /// Depends only on the requirement's own length, never on the evidence.
    pub fn effective_threshold(&self, requirement: &str) -> f64 {
        if requirement.split_whitespace().count() <= self.short_requirement_max_tokens {
            self.base_threshold - self.short_requirement_discount
        } else {
            self.base_threshold
        }
    }

    pub async fn match_requirements(
        &self,
        requirements: &[String],
        evidence: &[String],
        inferred_skills: &[String],
        embedder: &dyn EmbeddingProvider,
    ) -> Result<GapReport, EmbeddingError> {
        let requirements = normalize_all(requirements);
        if requirements.is_empty() {
            return Ok(GapReport::empty());
        }

        // Inferred skills only extend real evidence; they never stand in for it.
        if normalize_all(evidence).is_empty() {
            let scores = requirements
                .iter()
                .map(|r| RequirementScore {
                    requirement: r.clone(),
                    best_similarity: 0.0,
                    threshold: self.effective_threshold(r),
                    best_evidence: None,
                })
                .collect();
            return Ok(GapReport {
                matched: Vec::new(),
                missing: requirements,
                match_percentage: 0,
                scores,
                embedding_model: None,
            });
        }

        let evidence = normalize_all(evidence.iter().chain(inferred_skills));
        let requirement_vectors = embedder.embed(&requirements).await?;
        let evidence_vectors = embedder.embed(&evidence).await?;
        check_count(requirements.len(), requirement_vectors.len())?;
        check_count(evidence.len(), evidence_vectors.len())?;

        let mut matched = Vec::new();
        let mut missing = Vec::new();
        let mut scores = Vec::with_capacity(requirements.len());

        for (requirement, req_vector) in requirements.iter().zip(&requirement_vectors) {
            let best = evidence_vectors
                .iter()
                .enumerate()
                .map(|(i, ev)| (i, cosine_similarity(req_vector, ev)))
                .max_by(|a, b| a.1.total_cmp(&b.1));

            let (best_similarity, best_evidence) = match best {
                Some((i, sim)) => (sim, Some(evidence[i].clone())),
                None => (0.0, None),
            };
            let threshold = self.effective_threshold(requirement);

            debug!(
                "Requirement {:?}: best={:.3} threshold={:.2} evidence={:?}",
                requirement, best_similarity, threshold, best_evidence
            );

            if best_similarity >= threshold {
                matched.push(requirement.clone());
            } else {
                missing.push(requirement.clone());
            }
            scores.push(RequirementScore {
                requirement: requirement.clone(),
                best_similarity,
                threshold,
                best_evidence,
            });
        }

        let match_percentage = (matched.len() * 100 / requirements.len()) as u32;
        info!(
            "Gap match: {}/{} requirements matched ({}%)",
            matched.len(),
            requirements.len(),
            match_percentage
        );

        Ok(GapReport {
            matched,
            missing,
            match_percentage,
            scores,
            embedding_model: Some(embedder.model_id().to_string()),
        })
    }
}

fn check_count(expected: usize, actual: usize) -> Result<(), EmbeddingError> {
    if expected == actual {
        Ok(())
    } else {
        Err(EmbeddingError::CountMismatch { expected, actual })
    }
}
