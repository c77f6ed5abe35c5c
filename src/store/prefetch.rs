//! In-memory prefetch cache for detail pages, keyed `project-cache-{slug}`.

use crate::constants::{PREFETCH_CACHE_CAPACITY, PREFETCH_TIMEOUT, PROJECT_CACHE_KEY_PREFIX};
use crate::error::AppError;
use lru::LruCache;
use parking_lot::Mutex;
use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;

pub fn project_cache_key(slug: &str) -> String {
    format!("{}{}", PROJECT_CACHE_KEY_PREFIX, slug)
}

/// Bounded LRU of fetched records. Each prefetch is abandoned after a fixed
/// timeout; a failed or timed-out prefetch just leaves the cache unchanged.
pub struct PrefetchCache<T> {
    entries: Mutex<LruCache<String, T>>,
    timeout: Duration,
}

impl<T: Clone> PrefetchCache<T> {
    pub fn new() -> Self {
        Self::with_capacity(PREFETCH_CACHE_CAPACITY, PREFETCH_TIMEOUT)
    }

    pub fn with_capacity(capacity: usize, timeout: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            timeout,
        }
    }

    pub fn get(&self, slug: &str) -> Option<T> {
        self.entries.lock().get(&project_cache_key(slug)).cloned()
    }

    pub fn insert(&self, slug: &str, value: T) {
        self.entries.lock().put(project_cache_key(slug), value);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached value or runs `fetch`, caching a success.
    ///
    /// Returns `None` when the fetch fails or exceeds the timeout.
    pub async fn prefetch<F, Fut>(&self, slug: &str, fetch: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(hit) = self.get(slug) {
            log::debug!("Prefetch cache hit: {}", slug);
            return Some(hit);
        }

        match tokio::time::timeout(self.timeout, fetch()).await {
            Ok(Ok(value)) => {
                self.insert(slug, value.clone());
                Some(value)
            }
            Ok(Err(e)) => {
                log::debug!("Prefetch of {} failed: {}", slug, e);
                None
            }
            Err(_) => {
                log::debug!(
                    "Prefetch of {} abandoned after {}s",
                    slug,
                    self.timeout.as_secs()
                );
                None
            }
        }
    }
}

impl<T: Clone> Default for PrefetchCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_fetches_time_out_after_four_seconds() {
        let cache: PrefetchCache<String> = PrefetchCache::new();
        let started = tokio::time::Instant::now();
        let result = cache
            .prefetch("slow", || async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok("late".to_string())
            })
            .await;
        assert!(result.is_none());
        assert_eq!(started.elapsed(), Duration::from_secs(4));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn successes_are_cached() {
        let cache: PrefetchCache<u32> = PrefetchCache::new();
        assert_eq!(cache.prefetch("a", || async { Ok(1) }).await, Some(1));
        // second call is served from cache; the fetcher would fail
        let again = cache
            .prefetch("a", || async {
                Err(AppError::MalformedResponse("unused".into()))
            })
            .await;
        assert_eq!(again, Some(1));
        assert_eq!(project_cache_key("a"), "project-cache-a");
    }

    #[test]
    fn capacity_evicts_least_recent() {
        let cache: PrefetchCache<u32> = PrefetchCache::with_capacity(2, PREFETCH_TIMEOUT);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.get("a");
        cache.insert("c", 3);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
    }
}
