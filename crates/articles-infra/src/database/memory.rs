//! In-memory authoritative store, used when no database is configured and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use articles_core::domain::{Article, ArticleChanges, NewArticle};
use articles_core::error::RepoError;
use articles_core::ports::ArticleStore;

/// A map guarded by one mutex; holding it for a whole mutation gives the
/// same per-uuid serialisation a row lock gives in Postgres.
#[derive(Default)]
pub struct InMemoryArticleStore {
    rows: Mutex<HashMap<Uuid, Article>>,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }

    /// Current committed state of one article.
    pub async fn get(&self, uuid: Uuid) -> Option<Article> {
        self.rows.lock().await.get(&uuid).cloned()
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn insert(&self, new_article: NewArticle) -> Result<Article, RepoError> {
        let mut rows = self.rows.lock().await;
        if rows.contains_key(&new_article.uuid) {
            return Err(RepoError::Constraint(format!(
                "duplicate uuid {}",
                new_article.uuid
            )));
        }

        let article = Article {
            uuid: new_article.uuid,
            author: new_article.author,
            title: new_article.title,
            body: new_article.body,
            created_at: new_article.created_at,
            updated_at: new_article.updated_at,
        };
        rows.insert(article.uuid, article.clone());
        Ok(article)
    }

    async fn update(&self, uuid: Uuid, changes: ArticleChanges) -> Result<Article, RepoError> {
        let mut rows = self.rows.lock().await;
        let article = rows.get_mut(&uuid).ok_or(RepoError::NotFound)?;
        article.author = changes.author;
        article.title = changes.title;
        article.body = changes.body;
        article.updated_at = changes.updated_at;
        Ok(article.clone())
    }

    async fn delete(&self, uuid: Uuid) -> Result<Article, RepoError> {
        self.rows
            .lock()
            .await
            .remove(&uuid)
            .ok_or(RepoError::NotFound)
    }
}
