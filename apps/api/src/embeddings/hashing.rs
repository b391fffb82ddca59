//! Offline embedder: feature-hashed word tokens and character trigrams.
//!
//! No network, fully deterministic. Similarity is lexical rather than semantic, so it
//! is a development/offline stand-in for a sentence-transformer endpoint.

use async_trait::async_trait;

use super::{EmbeddingError, EmbeddingProvider};

/// Matches all-MiniLM-L6-v2 so index sizes line up with the HTTP backend.
pub const DEFAULT_DIMENSION: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub struct HashingEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashingEmbedder {
    /// `dimension` is clamped to at least 1.
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model_id: format!("feature-hashing-{dimension}"),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        let lowered = text.to_lowercase();

        for token in lowered.split_whitespace() {
            self.accumulate(&mut vector, token.as_bytes(), 1.0);

            let padded: Vec<char> = format!("#{token}#").chars().collect();
            for trigram in padded.windows(3) {
                let gram: String = trigram.iter().collect();
                self.accumulate(&mut vector, gram.as_bytes(), 0.5);
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }

    fn accumulate(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dimension as u64) as usize;
        // High bit picks the sign so collisions cancel instead of piling up.
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::vector::cosine_similarity;

    #[tokio::test]
    async fn test_embedding_has_configured_dimension() {
        let embedder = HashingEmbedder::new(64);
        let vectors = embedder.embed(&["rust".to_string()]).await.unwrap();
        assert_eq!(vectors[0].len(), 64);
    }

    #[tokio::test]
    async fn test_consistent_embeddings() {
        let embedder = HashingEmbedder::default();
        let texts = vec!["same text".to_string(), "same text".to_string()];
        let vectors = embedder.embed(&texts).await.unwrap();
        assert_eq!(vectors[0], vectors[1]);
    }

    #[tokio::test]
    async fn test_shared_tokens_score_higher_than_unrelated() {
        let embedder = HashingEmbedder::default();
        let texts = vec![
            "sql".to_string(),
            "sql queries for reporting".to_string(),
            "forklift operation".to_string(),
        ];
        let v = embedder.embed(&texts).await.unwrap();
        assert!(cosine_similarity(&v[0], &v[1]) > cosine_similarity(&v[0], &v[2]));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(8);
        let v = embedder.embed(&["   ".to_string()]).await.unwrap();
        assert!(v[0].iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_zero_dimension_is_clamped() {
        let embedder = HashingEmbedder::new(0);
        let v = embedder.embed(&["rust".to_string()]).await.unwrap();
        assert_eq!(v[0].len(), 1);
        assert_eq!(embedder.model_id(), "feature-hashing-1");
    }

    #[test]
    fn test_model_id_names_dimension() {
        assert_eq!(HashingEmbedder::new(384).model_id(), "feature-hashing-384");
    }
}
