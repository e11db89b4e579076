//! Short-TTL memoization of aggregate queries.
//!
//! A correctness-neutral performance shim: entries expire purely by elapsed
//! time, a stale read is identical to a miss, and there is no size bound or
//! LRU. Entries are written atomically as whole records, so a concurrent
//! reader sees either the previous value or the new one, never a torn mix.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::trace;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
}

#[derive(Debug)]
pub struct ResultCache<V> {
    entries: Arc<DashMap<String, CacheEntry<V>>>,
}

impl<V> Clone for ResultCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> ResultCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Expiry is checked lazily here: a hit past its TTL is dropped on the
    /// way out and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            if entry.created_at.elapsed() <= entry.ttl {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove(key);
        None
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Drop every expired entry. Called periodically by [`CacheSweeper`].
    pub fn sweep(&self) {
        self.entries
            .retain(|_, entry| entry.created_at.elapsed() <= entry.ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Periodic expiry sweep, owned by the process lifecycle rather than the
/// cache itself: spawned at startup, aborted on shutdown (or drop).
pub struct CacheSweeper {
    handle: JoinHandle<()>,
}

impl CacheSweeper {
    pub fn spawn<V>(cache: ResultCache<V>, period: Duration) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.sweep();
                trace!(entries = cache.len(), "cache sweep complete");
            }
        });
        Self { handle }
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_get_set_roundtrip() {
        let cache: ResultCache<u32> = ResultCache::new();
        cache.set("answer", 42, Duration::from_secs(60));
        assert_eq!(cache.get("answer"), Some(42));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_expired_entry_reads_as_miss() {
        let cache: ResultCache<u32> = ResultCache::new();
        cache.set("fleeting", 1, Duration::ZERO);
        sleep(Duration::from_millis(5));
        assert_eq!(cache.get("fleeting"), None);
        // The lazy check also removed the entry.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_is_last_writer_wins() {
        let cache: ResultCache<u32> = ResultCache::new();
        cache.set("k", 1, Duration::from_secs(60));
        cache.set("k", 2, Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let cache: ResultCache<u32> = ResultCache::new();
        cache.set("old", 1, Duration::ZERO);
        cache.set("fresh", 2, Duration::from_secs(60));
        sleep(Duration::from_millis(5));
        cache.sweep();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(2));
    }

    #[tokio::test]
    async fn test_sweeper_runs_in_background() {
        let cache: ResultCache<u32> = ResultCache::new();
        cache.set("old", 1, Duration::ZERO);
        let sweeper = CacheSweeper::spawn(cache.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(cache.is_empty());
        sweeper.shutdown();
    }
}
