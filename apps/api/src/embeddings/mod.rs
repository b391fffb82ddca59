//! Embedding providers: batch text → fixed-dimension vectors.
//!
//! The gap matcher and the skill index only see `EmbeddingProvider`; which backend
//! is active is decided once at startup from config.

use async_trait::async_trait;
use thiserror::Error;

pub mod hashing;
pub mod http;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbeddingClient;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding count mismatch: sent {expected} texts, received {actual} vectors")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("No embedding available for text: {0:?}")]
    UnknownText(String),
}

/// Order-preserving batch embedder: `output[i]` is the vector for `texts[i]`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Model identity recorded alongside match results for reproducibility.
    fn model_id(&self) -> &str;
}

/// Rejects batches whose vectors do not share one dimension.
pub(crate) fn ensure_uniform_dimension(vectors: &[Vec<f32>]) -> Result<(), EmbeddingError> {
    let Some(first) = vectors.first() else {
        return Ok(());
    };
    let expected = first.len();
    match vectors.iter().find(|v| v.len() != expected) {
        Some(bad) => Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: bad.len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_dimension_accepts_empty_batch() {
        assert!(ensure_uniform_dimension(&[]).is_ok());
    }

    #[test]
    fn test_uniform_dimension_rejects_ragged_batch() {
        let err = ensure_uniform_dimension(&[vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }
}
