//! Filtered nearest-neighbour search over ingested lesson plan parts.

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{Condition, Filter, ScoredPoint, SearchPointsBuilder};
use tracing::debug;

use super::error::{RetrievalError, RetrievalResult};

/// Payload keys written at ingestion time.
pub const PAYLOAD_LESSON_PLAN_ID: &str = "lessonPlanId";
pub const PAYLOAD_TITLE: &str = "title";
pub const PAYLOAD_KEY_STAGE: &str = "keyStage";
pub const PAYLOAD_SUBJECT: &str = "subject";
pub const PAYLOAD_CONTENT: &str = "content";

/// One stored fragment, closest first. `distance` is `1 - cosine similarity`.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonPlanHit {
    pub lesson_plan_id: String,
    pub title: String,
    pub key_stage: Option<String>,
    pub subject: Option<String>,
    pub content: String,
    pub distance: f32,
}

impl LessonPlanHit {
    pub fn new(lesson_plan_id: &str, title: &str, distance: f32) -> Self {
        Self {
            lesson_plan_id: lesson_plan_id.to_string(),
            title: title.to_string(),
            key_stage: None,
            subject: None,
            content: String::new(),
            distance,
        }
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    /// Text handed to the cross-encoder.
    pub fn document(&self) -> String {
        if self.content.is_empty() {
            self.title.clone()
        } else {
            format!("{}\n{}", self.title, self.content)
        }
    }

    fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let payload = point.payload;
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        Some(Self {
            lesson_plan_id: text(PAYLOAD_LESSON_PLAN_ID)?,
            title: text(PAYLOAD_TITLE).unwrap_or_default(),
            key_stage: text(PAYLOAD_KEY_STAGE),
            subject: text(PAYLOAD_SUBJECT),
            content: text(PAYLOAD_CONTENT).unwrap_or_default(),
            distance: 1.0 - point.score,
        })
    }
}

/// Vector search backend. Results must be ordered by ascending distance.
pub trait LessonPlanSearch: Send + Sync {
    fn search(
        &self,
        vector: Vec<f32>,
        key_stages: &[String],
        subjects: &[String],
        limit: u64,
    ) -> impl std::future::Future<Output = RetrievalResult<Vec<LessonPlanHit>>> + Send;
}

#[derive(Clone)]
pub struct QdrantLessonSearch {
    client: Qdrant,
    url: String,
    collection: String,
}

impl std::fmt::Debug for QdrantLessonSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantLessonSearch")
            .field("url", &self.url)
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl QdrantLessonSearch {
    pub fn new(url: &str, collection: &str) -> RetrievalResult<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| RetrievalError::SearchFailed {
                collection: collection.to_string(),
                message: format!("failed to connect to {}: {}", url, e),
            })?;

        Ok(Self {
            client,
            url: url.to_string(),
            collection: collection.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl LessonPlanSearch for QdrantLessonSearch {
    async fn search(
        &self,
        vector: Vec<f32>,
        key_stages: &[String],
        subjects: &[String],
        limit: u64,
    ) -> RetrievalResult<Vec<LessonPlanHit>> {
        let filter = Filter::must([
            Condition::matches(PAYLOAD_KEY_STAGE, key_stages.to_vec()),
            Condition::matches(PAYLOAD_SUBJECT, subjects.to_vec()),
        ]);

        let request = SearchPointsBuilder::new(&self.collection, vector, limit)
            .filter(filter)
            .with_payload(true);

        let response = self
            .client
            .search_points(request)
            .await
            .map_err(|e| RetrievalError::SearchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let hits: Vec<LessonPlanHit> = response
            .result
            .into_iter()
            .filter_map(LessonPlanHit::from_scored_point)
            .collect();

        debug!(collection = %self.collection, hits = hits.len(), "Qdrant search complete");
        Ok(hits)
    }
}
