//! Text → dense vector providers.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{RetrievalError, RetrievalResult};

pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> impl std::future::Future<Output = RetrievalResult<Vec<f32>>> + Send;

    fn dimensions(&self) -> usize;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    http: reqwest::Client,
    url: String,
    model: String,
    dimensions: usize,
    api_key: Option<String>,
}

impl OpenAiEmbedder {
    pub fn new(url: &str, model: &str, dimensions: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
            model: model.to_string(),
            dimensions,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> RetrievalResult<Vec<f32>> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: [text],
            dimensions: self.dimensions,
        };

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RetrievalError::EmbeddingFailed {
                message: e.to_string(),
            })?;

        let parsed: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| RetrievalError::EmbeddingFailed {
                    message: e.to_string(),
                })?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RetrievalError::EmbeddingFailed {
                message: "response contained no embeddings".to_string(),
            })?;

        if embedding.len() != self.dimensions {
            return Err(RetrievalError::EmbeddingFailed {
                message: format!(
                    "expected {} dimensions, got {}",
                    self.dimensions,
                    embedding.len()
                ),
            });
        }

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Deterministic, unit-length vectors derived from a BLAKE3 hash of the text.
///
/// Similar texts are not close; useful only for local runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        debug!(text_len = text.len(), "Generating hashed embedding");

        let digest = blake3::hash(text.as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest.as_bytes()[..8]);
        let mut state = u64::from_le_bytes(seed);

        let mut embedding = Vec::with_capacity(self.dimensions);
        for _ in 0..self.dimensions {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        normalize(&mut embedding);
        embedding
    }
}

fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in embedding.iter_mut() {
            *x /= norm;
        }
    }
}

impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> RetrievalResult<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Runtime choice between the remote and local embedders.
#[derive(Debug, Clone)]
pub enum EmbedderBackend {
    OpenAi(OpenAiEmbedder),
    Hash(HashEmbedder),
}

impl EmbeddingProvider for EmbedderBackend {
    async fn embed(&self, text: &str) -> RetrievalResult<Vec<f32>> {
        match self {
            EmbedderBackend::OpenAi(e) => e.embed(text).await,
            EmbedderBackend::Hash(e) => e.embed(text).await,
        }
    }

    fn dimensions(&self) -> usize {
        match self {
            EmbedderBackend::OpenAi(e) => e.dimensions(),
            EmbedderBackend::Hash(e) => e.dimensions(),
        }
    }
}
