//! OpenAI-compatible `/v1/embeddings` client (OpenAI, Ollama, vLLM, TEI all speak it).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ensure_uniform_dimension, EmbeddingError, EmbeddingProvider};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct HttpEmbeddingClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl HttpEmbeddingClient {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        model: String,
    ) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()?,
            endpoint,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self.client.post(&self.endpoint).json(&EmbeddingRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Embedding API returned {}: {}", status, message);
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response.json().await?;
        let vectors = reorder_by_index(body.data, texts.len())?;
        ensure_uniform_dimension(&vectors)?;

        debug!(
            "Embedded {} texts with {} (dim={})",
            texts.len(),
            self.model,
            vectors.first().map(Vec::len).unwrap_or(0)
        );

        Ok(vectors)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Providers may return data out of order; `index` is authoritative.
fn reorder_by_index(
    mut data: Vec<EmbeddingDatum>,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let count_mismatch = EmbeddingError::CountMismatch {
        expected,
        actual: data.len(),
    };
    if data.len() != expected {
        return Err(count_mismatch);
    }

    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(count_mismatch);
    }

    Ok(data.into_iter().map(|d| d.embedding).collect())
}
