//! Cache policy shared by the command and query sides.
//!
//! Two families of entries live in the shared cache:
//!
//! - `article-<uuid>`: one article, written by whichever side last saw its
//!   state, evicted on delete.
//! - `article-list-<md5>`: one list response, written by the query side and
//!   left to expire; it is never invalidated by events.
//!
//! Cache failures are never fatal. Reads that fail or do not decode are
//! misses; writes that fail are logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use md5::{Digest, Md5};
use uuid::Uuid;

use crate::domain::Article;
use crate::ports::{Cache, ListQuery};

/// Lifetime of every entry written under this policy.
pub const ENTRY_TTL: Duration = Duration::from_secs(600);

/// Key of the by-uuid entry.
pub fn article_key(uuid: &Uuid) -> String {
    format!("article-{uuid}")
}

/// Key of the by-query entry: MD5 of the canonical JSON of the request.
pub fn article_list_key(query: &ListQuery) -> String {
    // Struct serialization has a fixed field order, which makes it canonical.
    let canonical = serde_json::to_vec(query).unwrap_or_default();
    format!("article-list-{}", hex::encode(Md5::digest(&canonical)))
}

/// Typed view over the shared cache.
#[derive(Clone)]
pub struct ArticleCache {
    cache: Arc<dyn Cache>,
}

impl ArticleCache {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Read the by-uuid entry.
    pub async fn article(&self, uuid: &Uuid) -> Option<Article> {
        let key = article_key(uuid);
        let raw = self.cache.get(&key).await?;
        match serde_json::from_str(&raw) {
            Ok(article) => Some(article),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Undecodable cache entry, treating as miss");
                None
            }
        }
    }

    /// Write the by-uuid entry from an article.
    pub async fn put_article(&self, article: &Article) {
        match serde_json::to_string(article) {
            Ok(json) => self.put_article_json(&article.uuid, &json).await,
            Err(e) => tracing::warn!(uuid = %article.uuid, error = %e, "Failed to encode article"),
        }
    }

    /// Write the by-uuid entry verbatim, e.g. straight from an event body.
    pub async fn put_article_json(&self, uuid: &Uuid, json: &str) {
        self.put(&article_key(uuid), json).await;
    }

    /// Remove the by-uuid entry.
    pub async fn evict_article(&self, uuid: &Uuid) {
        let key = article_key(uuid);
        if let Err(e) = self.cache.delete(&key).await {
            tracing::warn!(key = %key, error = %e, "Cache eviction failed");
        }
    }

    /// Read the by-query entry.
    pub async fn list(&self, query: &ListQuery) -> Option<Vec<Article>> {
        let key = article_list_key(query);
        let raw = self.cache.get(&key).await?;
        match serde_json::from_str(&raw) {
            Ok(articles) => Some(articles),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Undecodable cache entry, treating as miss");
                None
            }
        }
    }

    /// Write the by-query entry.
    pub async fn put_list(&self, query: &ListQuery, articles: &[Article]) {
        match serde_json::to_string(articles) {
            Ok(json) => self.put(&article_list_key(query), &json).await,
            Err(e) => tracing::warn!(error = %e, "Failed to encode article list"),
        }
    }

    async fn put(&self, key: &str, value: &str) {
        if let Err(e) = self.cache.set(key, value, Some(ENTRY_TTL)).await {
            tracing::warn!(key = %key, error = %e, "Cache write failed");
        }
    }
}
