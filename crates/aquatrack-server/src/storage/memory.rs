//! In-memory query cache with staged (two-phase) updates
//!
//! Optimistic mutations are written as *staged* values: readers observe the
//! staged value immediately, and the caller either commits it once the store
//! confirms the write or reverts it when the write fails. A plain `set`
//! bypasses staging for read-path caching.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct QueryCache {
    data: Arc<DashMap<String, CacheEntry>>,
}

struct CacheEntry {
    committed: Option<Vec<u8>>,
    staged: Option<Vec<u8>>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn expired(&self, now: Instant) -> bool {
        self.expires_at.map(|at| now > at).unwrap_or(false)
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let cache = Self {
            data: Arc::new(DashMap::new()),
        };

        cache.start_sweeper();

        cache
    }

    /// Read a value; a staged value shadows the committed one.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.data.get(key)?;
        if entry.expired(Instant::now()) {
            drop(entry);
            self.data.remove(key);
            return None;
        }
        entry.staged.clone().or_else(|| entry.committed.clone())
    }

    /// Store a confirmed value, discarding any staged one.
    pub fn set(&self, key: String, value: Vec<u8>) {
        self.data.insert(
            key,
            CacheEntry {
                committed: Some(value),
                staged: None,
                expires_at: None,
            },
        );
    }

    /// Store a confirmed value that expires after `ttl`.
    pub fn set_with_ttl(&self, key: String, value: Vec<u8>, ttl: Duration) {
        self.data.insert(
            key,
            CacheEntry {
                committed: Some(value),
                staged: None,
                expires_at: Some(Instant::now() + ttl),
            },
        );
    }

    /// Stage a tentative value. The previous committed value is retained so
    /// the entry can be reverted if the store write fails.
    pub fn stage(&self, key: String, value: Vec<u8>) {
        self.data
            .entry(key)
            .and_modify(|entry| entry.staged = Some(value.clone()))
            .or_insert(CacheEntry {
                committed: None,
                staged: Some(value),
                expires_at: None,
            });
    }

    /// Promote a staged value to committed. No-op if nothing is staged.
    pub fn commit(&self, key: &str) {
        if let Some(mut entry) = self.data.get_mut(key) {
            if let Some(staged) = entry.staged.take() {
                entry.committed = Some(staged);
            }
        }
    }

    /// Drop a staged value, restoring the previous committed one. Entries
    /// that never had a committed value are removed entirely.
    pub fn revert(&self, key: &str) {
        let remove = match self.data.get_mut(key) {
            Some(mut entry) => {
                entry.staged = None;
                entry.committed.is_none()
            }
            None => false,
        };
        if remove {
            self.data.remove(key);
        }
    }

    /// Invalidate a key.
    pub fn delete(&self, key: &str) {
        self.data.remove(key);
    }

    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn start_sweeper(&self) {
        let data = self.data.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;

                let now = Instant::now();
                let expired: Vec<String> = data
                    .iter()
                    .filter(|entry| entry.expired(now))
                    .map(|entry| entry.key().clone())
                    .collect();

                for key in expired {
                    data.remove(&key);
                }
            }
        });
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_operations() {
        let cache = QueryCache::new();

        cache.set("key1".to_string(), vec![1, 2, 3]);
        assert_eq!(cache.get("key1"), Some(vec![1, 2, 3]));

        assert_eq!(cache.get("nonexistent"), None);

        cache.delete("key1");
        assert_eq!(cache.get("key1"), None);
    }

    #[tokio::test]
    async fn test_ttl() {
        let cache = QueryCache::new();

        cache.set_with_ttl("key1".to_string(), vec![1, 2, 3], Duration::from_millis(10));
        assert_eq!(cache.get("key1"), Some(vec![1, 2, 3]));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("key1"), None);
    }

    #[tokio::test]
    async fn test_staged_value_shadows_committed() {
        let cache = QueryCache::new();

        cache.set("fish:1".to_string(), vec![1]);
        cache.stage("fish:1".to_string(), vec![2]);

        // Readers see the tentative value while the store write is in flight.
        assert_eq!(cache.get("fish:1"), Some(vec![2]));
    }

    #[tokio::test]
    async fn test_commit_promotes_staged() {
        let cache = QueryCache::new();

        cache.set("fish:1".to_string(), vec![1]);
        cache.stage("fish:1".to_string(), vec![2]);
        cache.commit("fish:1");

        assert_eq!(cache.get("fish:1"), Some(vec![2]));

        // Committing again is harmless.
        cache.commit("fish:1");
        assert_eq!(cache.get("fish:1"), Some(vec![2]));
    }

    #[tokio::test]
    async fn test_revert_restores_previous_value() {
        let cache = QueryCache::new();

        cache.set("fish:1".to_string(), vec![1]);
        cache.stage("fish:1".to_string(), vec![2]);
        cache.revert("fish:1");

        assert_eq!(cache.get("fish:1"), Some(vec![1]));
    }

    #[tokio::test]
    async fn test_revert_without_committed_removes_entry() {
        let cache = QueryCache::new();

        cache.stage("fish:9".to_string(), vec![7]);
        assert_eq!(cache.get("fish:9"), Some(vec![7]));

        cache.revert("fish:9");
        assert_eq!(cache.get("fish:9"), None);
        assert!(!cache.exists("fish:9"));
    }
}
