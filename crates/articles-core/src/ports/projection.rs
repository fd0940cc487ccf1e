use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Article;
use crate::error::RepoError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 25;

/// Result of inserting into the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A document with the same uuid is already present (replayed event).
    AlreadyExists,
}

/// A list request against the projection.
///
/// Field order is part of the cache key: the canonical JSON of this struct is
/// hashed into `article-list-<digest>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u64,
    pub limit: u64,
    pub query: String,
    pub author: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            query: String::new(),
            author: String::new(),
        }
    }
}

impl ListQuery {
    /// Build a query from optional request parameters, substituting defaults
    /// for anything missing or out of range.
    pub fn new(
        page: Option<u64>,
        limit: Option<u64>,
        query: Option<String>,
        author: Option<String>,
    ) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
            query: query.map(|q| q.trim().to_string()).unwrap_or_default(),
            author: author.map(|a| a.trim().to_string()).unwrap_or_default(),
        }
    }

    /// Number of documents to skip for this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Whether `article` passes the author and free-text filters.
    ///
    /// Author is an exact match; the free-text query is a case-insensitive
    /// substring match on title or body. Empty filters match everything.
    pub fn matches(&self, article: &Article) -> bool {
        let author_ok = self.author.is_empty() || article.author == self.author;
        let query_ok = self.query.is_empty() || {
            let needle = self.query.to_lowercase();
            article.title.to_lowercase().contains(&needle)
                || article.body.to_lowercase().contains(&needle)
        };
        author_ok && query_ok
    }
}

/// Read-optimised projection of the articles.
#[async_trait]
pub trait ArticleProjection: Send + Sync {
    /// Insert a document; an existing document with the same uuid is left untouched.
    async fn insert(&self, article: &Article) -> Result<InsertOutcome, RepoError>;

    /// Overwrite content and timestamps of the matching document.
    /// Returns `false` when no document has that uuid.
    async fn update(&self, article: &Article) -> Result<bool, RepoError>;

    /// Remove the matching document. Returns `false` when none existed.
    async fn delete(&self, uuid: Uuid) -> Result<bool, RepoError>;

    /// Find a document by uuid.
    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Article>, RepoError>;

    /// List documents matching `query`, newest `created_at` first.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Article>, RepoError>;
}
