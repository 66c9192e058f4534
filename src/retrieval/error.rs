//! Retrieval error types.

use thiserror::Error;

/// Errors from the embed → search → rerank chain.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RetrievalError {
    /// Key stage or subject filters were empty. Raised before any backend call.
    #[error("{filter} filters must not be empty")]
    MissingFilter { filter: &'static str },

    /// Embedding provider failed or returned an unusable vector.
    #[error("embedding failed: {message}")]
    EmbeddingFailed { message: String },

    /// Vector search failed.
    #[error("search failed in collection '{collection}': {message}")]
    SearchFailed { collection: String, message: String },

    /// Cross-encoder failed or returned out-of-range indices.
    #[error("rerank failed: {message}")]
    RerankFailed { message: String },

    /// Rejected by [`crate::retrieval::RetrievalConfig::validate`].
    #[error("invalid retrieval config: {reason}")]
    InvalidConfig { reason: String },
}

/// Result type for retrieval operations.
pub type RetrievalResult<T> = Result<T, RetrievalError>;
