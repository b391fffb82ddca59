//! Skill inference: generalizes low-level resume evidence to ontology parent skills.
//!
//! The index embeds every ontology label once at startup. Inference embeds the
//! evidence, takes the k nearest labels, and maps sufficiently close child skills to
//! their parents.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::analysis::state::normalize;
use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::skills::ontology::SkillOntology;
use crate::skills::vector::FlatL2Index;

pub const NEIGHBORS_PER_EVIDENCE: usize = 3;
pub const INFERENCE_THRESHOLD: f64 = 0.65;

pub struct SkillIndex {
    ontology: Arc<SkillOntology>,
    labels: Vec<String>,
    index: FlatL2Index,
    embedding_model: String,
}

impl SkillIndex {
    /// Embeds every parent and child label. Called once; the result is read-only.
    pub async fn build(
        ontology: Arc<SkillOntology>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self, EmbeddingError> {
        let labels = ontology.labels();
        let vectors = embedder.embed(&labels).await?;
        if vectors.len() != labels.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: labels.len(),
                actual: vectors.len(),
            });
        }

        let index = FlatL2Index::new(vectors);
        info!(
            "Skill index built: {} labels across {} parent skills (model: {})",
            index.len(),
            ontology.parent_count(),
            embedder.model_id()
        );

        Ok(Self {
            ontology,
            labels,
            index,
            embedding_model: embedder.model_id().to_string(),
        })
    }

    /// Sorted, deduplicated parent skills implied by `evidence`.
    ///
    /// similarity = 1 / (1 + d) where d is the squared L2 distance to a label.
    pub async fn infer_parent_skills(
        &self,
        evidence: &[String],
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Vec<String>, EmbeddingError> {
        let evidence: Vec<String> = evidence
            .iter()
            .map(|e| normalize(e))
            .filter(|e| !e.is_empty())
            .collect();
        if evidence.is_empty() || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = embedder.embed(&evidence).await?;
        if vectors.len() != evidence.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: evidence.len(),
                actual: vectors.len(),
            });
        }
        let mut inferred = BTreeSet::new();

        for (text, vector) in evidence.iter().zip(&vectors) {
            for hit in self.index.search(vector, NEIGHBORS_PER_EVIDENCE) {
                let similarity = 1.0 / (1.0 + hit.distance);
                if similarity < INFERENCE_THRESHOLD {
                    continue;
                }

                let label = &self.labels[hit.id];
                for parent in self.ontology.parents_of(label) {
                    debug!(
                        "Evidence {:?} ~ {:?} (sim={:.3}) implies {:?}",
                        text, label, similarity, parent
                    );
                    inferred.insert(parent.clone());
                }
            }
        }

        Ok(inferred.into_iter().collect())
    }

    /// Model the label vectors were built with; inference must use the same one.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}
