//! In-memory cache implementation - used by tests and single-process setups.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use articles_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// In-memory cache using a HashMap behind an async RwLock.
///
/// Expired entries are dropped lazily on read. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if entry.is_expired() {
            drop(store);
            let mut store = self.store.write().await;
            if store.get(key).is_some_and(CacheEntry::is_expired) {
                store.remove(key);
            }
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value: value.to_string(),
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        self.store.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let cache = InMemoryCache::new();
        cache.set("article-1", "{}", None).await.unwrap();
        assert_eq!(cache.get("article-1").await.as_deref(), Some("{}"));
        cache.delete("article-1").await.unwrap();
        assert!(!cache.exists("article-1").await);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryCache::new();
        cache
            .set("article-2", "{}", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert!(cache.exists("article-2").await);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("article-2").await, None);
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let cache = InMemoryCache::new();
        cache.set("k", "old", None).await.unwrap();
        cache.set("k", "new", None).await.unwrap();
        assert_eq!(cache.get("k").await.as_deref(), Some("new"));
    }
}
