use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::embedding::{EmbeddingProvider, HashEmbedder};
use super::error::{RetrievalError, RetrievalResult};
use super::rerank::{CrossEncoder, LexicalCrossEncoder, RerankScore};
use super::search::{LessonPlanHit, LessonPlanSearch};
use super::service::LessonPlanRetriever;
use crate::model::RelevantLessonPlan;

/// Hashed embedder that counts calls.
#[derive(Debug)]
pub struct MockEmbedder {
    inner: HashEmbedder,
    calls: AtomicUsize,
    fail: bool,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            inner: HashEmbedder::new(dimensions),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing(dimensions: usize) -> Self {
        Self {
            fail: true,
            ..Self::new(dimensions)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> RetrievalResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RetrievalError::EmbeddingFailed {
                message: "mock embedder failure".to_string(),
            });
        }
        Ok(self.inner.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// Search backend returning canned hits in the given order (truncated to `limit`).
#[derive(Debug, Default)]
pub struct MockLessonPlanSearch {
    hits: Vec<LessonPlanHit>,
    calls: AtomicUsize,
    last_filters: RwLock<Option<(Vec<String>, Vec<String>)>>,
}

impl MockLessonPlanSearch {
    pub fn new(hits: Vec<LessonPlanHit>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_filters(&self) -> Option<(Vec<String>, Vec<String>)> {
        self.last_filters.read().expect("lock poisoned").clone()
    }
}

impl LessonPlanSearch for MockLessonPlanSearch {
    async fn search(
        &self,
        _vector: Vec<f32>,
        key_stages: &[String],
        subjects: &[String],
        limit: u64,
    ) -> RetrievalResult<Vec<LessonPlanHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_filters.write().expect("lock poisoned") =
            Some((key_stages.to_vec(), subjects.to_vec()));
        Ok(self.hits.iter().take(limit as usize).cloned().collect())
    }
}

/// Cross-encoder that counts calls; scores by fixed values or lexically.
#[derive(Debug, Default)]
pub struct MockCrossEncoder {
    fixed_scores: Option<Vec<f32>>,
    calls: AtomicUsize,
}

impl MockCrossEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `scores[i]` is the score of document `i`.
    pub fn with_scores(scores: Vec<f32>) -> Self {
        Self {
            fixed_scores: Some(scores),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CrossEncoder for MockCrossEncoder {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> RetrievalResult<Vec<RerankScore>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fixed_scores {
            Some(scores) => {
                let mut out: Vec<RerankScore> = documents
                    .iter()
                    .enumerate()
                    .map(|(index, _)| RerankScore {
                        index,
                        score: scores.get(index).copied().unwrap_or(0.0),
                    })
                    .collect();
                out.sort_by(|a, b| b.score.total_cmp(&a.score));
                out.truncate(top_n);
                Ok(out)
            }
            None => LexicalCrossEncoder::new().rerank(query, documents, top_n).await,
        }
    }
}

/// Retriever returning a fixed list and counting calls.
#[derive(Debug, Default)]
pub struct MockLessonPlanRetriever {
    results: Vec<RelevantLessonPlan>,
    calls: RwLock<Vec<(String, Vec<String>, Vec<String>)>>,
}

impl MockLessonPlanRetriever {
    pub fn new(results: Vec<RelevantLessonPlan>) -> Self {
        Self {
            results,
            calls: RwLock::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().expect("lock poisoned").len()
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>, Vec<String>)> {
        self.calls.read().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl LessonPlanRetriever for MockLessonPlanRetriever {
    async fn relevant_lesson_plans(
        &self,
        title: &str,
        key_stages: &[String],
        subjects: &[String],
    ) -> RetrievalResult<Vec<RelevantLessonPlan>> {
        self.calls.write().expect("lock poisoned").push((
            title.to_string(),
            key_stages.to_vec(),
            subjects.to_vec(),
        ));
        Ok(self.results.clone())
    }
}
