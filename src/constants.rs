//! Cross-cutting, shared constants.
//!
//! Retrieval sizes are defaults; [`crate::retrieval::RetrievalConfig`] carries the runtime values.

/// Nearest-neighbour candidates fetched before reranking.
pub const DEFAULT_TOP_K_SEARCH: u64 = 50;

/// Lesson plans kept after cross-encoder reranking.
pub const DEFAULT_TOP_K_FINAL: usize = 5;

/// Output size requested from the embedding model.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

pub const DEFAULT_RERANK_MODEL: &str = "rerank-english-v3.0";

pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

pub const DEFAULT_COLLECTION_NAME: &str = "lesson_plan_parts";

/// Retrieval results are reused for this long.
pub const DEFAULT_RETRIEVAL_CACHE_TTL_SECS: u64 = 15 * 60;

pub const DEFAULT_RETRIEVAL_CACHE_CAPACITY: u64 = 1_000;

/// Similar lessons consulted per pipeline run.
pub const DEFAULT_MAX_SIMILAR_LESSONS: usize = 3;

/// Questions per pool cut from question-level search results.
pub const DEFAULT_QUESTION_POOL_SIZE: usize = 6;

/// Maximum questions taken from one question-level search.
pub const DEFAULT_QUESTION_SEARCH_LIMIT: usize = 100;

/// Title used for based-on pools when the reference carries none.
pub const BASED_ON_FALLBACK_TITLE: &str = "Based on lesson";

/// Length of the public report identifier.
pub const REPORT_ID_LEN: usize = 16;

/// Prefix for child task names recorded on spans.
pub const TASK_SPAN_PREFIX: &str = "quiz.";
