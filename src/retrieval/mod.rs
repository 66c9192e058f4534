//! Relevant lesson plan retrieval: embed the title, search within key stage and
//! subject, keep one hit per lesson, rerank with a cross-encoder.
//!
//! Backends are generic parameters (`EmbeddingProvider`, `LessonPlanSearch`,
//! `CrossEncoder`); [`LessonPlanRetriever`] is the object-safe face used elsewhere.

pub mod cache;
pub mod config;
pub mod embedding;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod rerank;
pub mod search;
pub mod service;


pub use cache::{RetrievalCache, cache_key};
pub use config::RetrievalConfig;
pub use embedding::{EmbedderBackend, EmbeddingProvider, HashEmbedder, OpenAiEmbedder};
pub use error::{RetrievalError, RetrievalResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCrossEncoder, MockEmbedder, MockLessonPlanRetriever, MockLessonPlanSearch};
pub use rerank::{CrossEncoder, CrossEncoderBackend, HttpCrossEncoder, LexicalCrossEncoder, RerankScore};
pub use search::{LessonPlanHit, LessonPlanSearch, QdrantLessonSearch};
pub use service::{LessonPlanRetriever, RetrievalService, dedup_by_lesson};

/// Service wired from configuration in the binary.
pub type ConfiguredRetrievalService =
    RetrievalService<EmbedderBackend, QdrantLessonSearch, CrossEncoderBackend>;
