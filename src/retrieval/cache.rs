use std::time::Duration;

use moka::sync::Cache;

use crate::model::RelevantLessonPlan;

/// TTL cache of ranked results keyed by [`cache_key`].
#[derive(Clone)]
pub struct RetrievalCache {
    inner: Cache<String, Vec<RelevantLessonPlan>>,
}

impl std::fmt::Debug for RetrievalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

impl RetrievalCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<RelevantLessonPlan>> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: String, value: Vec<RelevantLessonPlan>) {
        self.inner.insert(key, value);
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

/// BLAKE3 hex of the title and filters exactly as the backends see them.
///
/// Filter order and repeats are ignored; case and whitespace are not, since the
/// search matches filter values exactly.
pub fn cache_key(title: &str, key_stages: &[String], subjects: &[String]) -> String {
    fn normalized(values: &[String]) -> Vec<&str> {
        let mut out: Vec<&str> = values.iter().map(String::as_str).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(&(title.len() as u64).to_le_bytes());
    hasher.update(title.as_bytes());
    for (tag, values) in [(b"k", normalized(key_stages)), (b"s", normalized(subjects))] {
        hasher.update(tag);
        for value in values {
            hasher.update(&(value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
