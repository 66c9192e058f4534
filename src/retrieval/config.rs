use std::time::Duration;

use crate::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_RETRIEVAL_CACHE_CAPACITY,
    DEFAULT_RETRIEVAL_CACHE_TTL_SECS, DEFAULT_TOP_K_FINAL, DEFAULT_TOP_K_SEARCH,
};

use super::error::{RetrievalError, RetrievalResult};

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Nearest neighbours requested from the search backend.
    pub top_k_search: u64,
    /// Lesson plans kept after reranking.
    pub top_k_final: usize,
    pub collection_name: String,
    pub vector_size: usize,
    /// `None` disables result caching.
    pub cache_ttl: Option<Duration>,
    pub cache_capacity: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k_search: DEFAULT_TOP_K_SEARCH,
            top_k_final: DEFAULT_TOP_K_FINAL,
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            vector_size: DEFAULT_EMBEDDING_DIMENSIONS,
            cache_ttl: Some(Duration::from_secs(DEFAULT_RETRIEVAL_CACHE_TTL_SECS)),
            cache_capacity: DEFAULT_RETRIEVAL_CACHE_CAPACITY,
        }
    }
}

impl RetrievalConfig {
    pub fn with_top_k(top_k_search: u64, top_k_final: usize) -> Self {
        Self {
            top_k_search,
            top_k_final,
            ..Default::default()
        }
    }

    pub fn collection_name(mut self, name: &str) -> Self {
        self.collection_name = name.to_string();
        self
    }

    pub fn vector_size(mut self, size: usize) -> Self {
        self.vector_size = size;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_ttl = None;
        self
    }

    pub fn validate(&self) -> RetrievalResult<()> {
        if self.top_k_search == 0 {
            return Err(RetrievalError::InvalidConfig {
                reason: "top_k_search must be > 0".to_string(),
            });
        }
        if self.top_k_final == 0 {
            return Err(RetrievalError::InvalidConfig {
                reason: "top_k_final must be > 0".to_string(),
            });
        }
        if self.top_k_final as u64 > self.top_k_search {
            return Err(RetrievalError::InvalidConfig {
                reason: format!(
                    "top_k_final ({}) cannot be greater than top_k_search ({})",
                    self.top_k_final, self.top_k_search
                ),
            });
        }
        if self.vector_size == 0 {
            return Err(RetrievalError::InvalidConfig {
                reason: "vector_size must be > 0".to_string(),
            });
        }
        if self.collection_name.trim().is_empty() {
            return Err(RetrievalError::InvalidConfig {
                reason: "collection_name cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
