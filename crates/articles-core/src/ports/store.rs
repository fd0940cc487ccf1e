use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Article, ArticleChanges, NewArticle};
use crate::error::RepoError;

/// Authoritative article store.
///
/// Every mutation runs in its own transaction and returns the row as it was
/// committed. Updates and deletes lock the row first so concurrent writers
/// to the same uuid serialise.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a new article.
    async fn insert(&self, article: NewArticle) -> Result<Article, RepoError>;

    /// Replace author, title and body and bump `updated_at`.
    /// Fails with [`RepoError::NotFound`] for an unknown uuid.
    async fn update(&self, uuid: Uuid, changes: ArticleChanges) -> Result<Article, RepoError>;

    /// Remove an article, returning it as it was immediately before deletion.
    /// Fails with [`RepoError::NotFound`] for an unknown uuid.
    async fn delete(&self, uuid: Uuid) -> Result<Article, RepoError>;
}
