//! Cross-encoder relevance scoring.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::{RetrievalError, RetrievalResult};

/// Score for `documents[index]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerankScore {
    pub index: usize,
    pub score: f32,
}

/// Scores documents against a query. Returns at most `top_n` entries, best first.
pub trait CrossEncoder: Send + Sync {
    fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> impl std::future::Future<Output = RetrievalResult<Vec<RerankScore>>> + Send;
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

/// Cohere-compatible `/rerank` endpoint.
#[derive(Debug, Clone)]
pub struct HttpCrossEncoder {
    http: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpCrossEncoder {
    pub fn new(url: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

impl CrossEncoder for HttpCrossEncoder {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> RetrievalResult<Vec<RerankScore>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let body = RerankRequest {
            model: &self.model,
            query,
            documents,
            top_n: top_n.min(documents.len()),
        };

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RetrievalError::RerankFailed {
                message: e.to_string(),
            })?;

        let parsed: RerankResponse =
            response
                .json()
                .await
                .map_err(|e| RetrievalError::RerankFailed {
                    message: e.to_string(),
                })?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| RerankScore {
                index: r.index,
                score: r.relevance_score,
            })
            .collect())
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does",
    "did", "will", "would", "can", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as",
    "into", "about", "then", "there", "when", "where", "why", "how", "all", "each", "some", "no",
    "not", "only", "so", "than", "too", "very", "and", "but", "if", "or", "what", "which", "who",
    "this", "that", "these", "those", "it", "its", "lesson", "pupils",
];

/// Local keyword-overlap scorer (recall and Jaccard through a sigmoid).
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalCrossEncoder;

impl LexicalCrossEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, query: &str, document: &str) -> f32 {
        let query_words = terms(query);
        if query_words.is_empty() {
            return 0.0;
        }
        let document_words = terms(document);

        let matches = query_words.intersection(&document_words).count();
        let recall = matches as f32 / query_words.len() as f32;
        let union = query_words.union(&document_words).count();
        let jaccard = if union > 0 {
            matches as f32 / union as f32
        } else {
            0.0
        };

        let base = 0.6 * recall + 0.4 * jaccard;
        (1.0 / (1.0 + (-8.0 * (base - 0.5)).exp())).clamp(0.0, 1.0)
    }

    /// Distinct non-stop-word terms the query and document have in common.
    pub fn shared_terms(&self, query: &str, document: &str) -> usize {
        terms(query).intersection(&terms(document)).count()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

impl CrossEncoder for LexicalCrossEncoder {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> RetrievalResult<Vec<RerankScore>> {
        let mut scores: Vec<RerankScore> = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| RerankScore {
                index,
                score: self.score(query, doc),
            })
            .collect();
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores.truncate(top_n);
        Ok(scores)
    }
}

/// Runtime choice between the remote and local cross-encoders.
#[derive(Debug, Clone)]
pub enum CrossEncoderBackend {
    Http(HttpCrossEncoder),
    Lexical(LexicalCrossEncoder),
}

impl CrossEncoder for CrossEncoderBackend {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> RetrievalResult<Vec<RerankScore>> {
        match self {
            CrossEncoderBackend::Http(c) => c.rerank(query, documents, top_n).await,
            CrossEncoderBackend::Lexical(c) => c.rerank(query, documents, top_n).await,
        }
    }
}
