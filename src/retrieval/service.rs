use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::cache::{RetrievalCache, cache_key};
use super::config::RetrievalConfig;
use super::embedding::EmbeddingProvider;
use super::error::{RetrievalError, RetrievalResult};
use super::rerank::CrossEncoder;
use super::search::{LessonPlanHit, LessonPlanSearch};
use crate::model::RelevantLessonPlan;

/// Object-safe view of the retrieval service, used by generators and the gateway.
#[async_trait]
pub trait LessonPlanRetriever: Send + Sync {
    async fn relevant_lesson_plans(
        &self,
        title: &str,
        key_stages: &[String],
        subjects: &[String],
    ) -> RetrievalResult<Vec<RelevantLessonPlan>>;
}

/// Embed → filtered search → dedup → cross-encoder rerank.
pub struct RetrievalService<E: EmbeddingProvider, S: LessonPlanSearch, C: CrossEncoder> {
    embedder: E,
    search: S,
    reranker: C,
    config: RetrievalConfig,
    cache: Option<RetrievalCache>,
}

impl<E: EmbeddingProvider, S: LessonPlanSearch, C: CrossEncoder> std::fmt::Debug
    for RetrievalService<E, S, C>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingProvider, S: LessonPlanSearch, C: CrossEncoder> RetrievalService<E, S, C> {
    pub fn new(embedder: E, search: S, reranker: C, config: RetrievalConfig) -> RetrievalResult<Self> {
        config.validate()?;

        if embedder.dimensions() != config.vector_size {
            return Err(RetrievalError::InvalidConfig {
                reason: format!(
                    "embedder produces {} dimensions, collection expects {}",
                    embedder.dimensions(),
                    config.vector_size
                ),
            });
        }

        let cache = config
            .cache_ttl
            .map(|ttl| RetrievalCache::new(config.cache_capacity, ttl));

        Ok(Self {
            embedder,
            search,
            reranker,
            config,
            cache,
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn search_backend(&self) -> &S {
        &self.search
    }

    pub fn reranker(&self) -> &C {
        &self.reranker
    }

    /// Ranked lesson plans relevant to `title`, best first.
    ///
    /// Both filter lists must be non-empty; this is checked before any backend call.
    #[instrument(skip(self, key_stages, subjects), fields(title_len = title.len()))]
    pub async fn relevant_lesson_plans(
        &self,
        title: &str,
        key_stages: &[String],
        subjects: &[String],
    ) -> RetrievalResult<Vec<RelevantLessonPlan>> {
        if key_stages.is_empty() {
            return Err(RetrievalError::MissingFilter { filter: "key stage" });
        }
        if subjects.is_empty() {
            return Err(RetrievalError::MissingFilter { filter: "subject" });
        }

        let key = cache_key(title, key_stages, subjects);
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            debug!(results = cached.len(), "Retrieval cache hit");
            return Ok(cached);
        }

        let vector = self.embedder.embed(title).await?;

        let hits = self
            .search
            .search(vector, key_stages, subjects, self.config.top_k_search)
            .await?;
        let searched = hits.len();

        let unique = dedup_by_lesson(hits);
        debug!(searched, unique = unique.len(), "Search complete, reranking");

        let ranked = if unique.is_empty() {
            Vec::new()
        } else {
            self.rerank(title, unique).await?
        };

        info!(
            searched,
            returned = ranked.len(),
            best_score = ranked.first().map(|r| r.relevance_score),
            "Retrieval complete"
        );

        if let Some(cache) = &self.cache {
            cache.insert(key, ranked.clone());
        }
        Ok(ranked)
    }

    async fn rerank(
        &self,
        title: &str,
        hits: Vec<LessonPlanHit>,
    ) -> RetrievalResult<Vec<RelevantLessonPlan>> {
        let documents: Vec<String> = hits.iter().map(LessonPlanHit::document).collect();

        let mut scores = self
            .reranker
            .rerank(title, &documents, self.config.top_k_final)
            .await?;

        if let Some(bad) = scores.iter().find(|s| s.index >= hits.len()) {
            return Err(RetrievalError::RerankFailed {
                message: format!("index {} out of range for {} documents", bad.index, hits.len()),
            });
        }

        scores.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut seen = HashSet::new();
        let ranked = scores
            .into_iter()
            .filter(|s| seen.insert(s.index))
            .take(self.config.top_k_final)
            .map(|s| {
                let hit = &hits[s.index];
                RelevantLessonPlan {
                    lesson_plan_id: hit.lesson_plan_id.clone(),
                    title: hit.title.clone(),
                    key_stage: hit.key_stage.clone(),
                    subject: hit.subject.clone(),
                    content: hit.content.clone(),
                    relevance_score: s.score,
                }
            })
            .collect();

        Ok(ranked)
    }
}

/// Keeps the first (closest) hit per lesson plan id.
pub fn dedup_by_lesson(hits: Vec<LessonPlanHit>) -> Vec<LessonPlanHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.lesson_plan_id.clone()))
        .collect()
}

#[async_trait]
impl<E, S, C> LessonPlanRetriever for RetrievalService<E, S, C>
where
    E: EmbeddingProvider + 'static,
    S: LessonPlanSearch + 'static,
    C: CrossEncoder + 'static,
{
    async fn relevant_lesson_plans(
        &self,
        title: &str,
        key_stages: &[String],
        subjects: &[String],
    ) -> RetrievalResult<Vec<RelevantLessonPlan>> {
        RetrievalService::relevant_lesson_plans(self, title, key_stages, subjects).await
    }
}
