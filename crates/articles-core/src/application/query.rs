//! Query reader: cache first, projection on miss.

use std::sync::Arc;

use uuid::Uuid;

use crate::cache::ArticleCache;
use crate::domain::Article;
use crate::error::DomainError;
use crate::ports::{ArticleProjection, ListQuery};

pub struct ArticleQueryService {
    projection: Arc<dyn ArticleProjection>,
    cache: ArticleCache,
}

impl ArticleQueryService {
    pub fn new(projection: Arc<dyn ArticleProjection>, cache: ArticleCache) -> Self {
        Self { projection, cache }
    }

    /// Fetch a single article.
    pub async fn get_single(&self, uuid: Uuid) -> Result<Article, DomainError> {
        if let Some(article) = self.cache.article(&uuid).await {
            tracing::debug!(uuid = %uuid, "Article served from cache");
            return Ok(article);
        }

        let article = self
            .projection
            .find_by_uuid(uuid)
            .await
            .map_err(DomainError::Storage)?
            .ok_or_else(|| DomainError::article_not_found(uuid))?;

        self.cache.put_article(&article).await;
        Ok(article)
    }

    /// Fetch a page of articles, newest first.
    ///
    /// Results are cached per request for the entry TTL and are not
    /// invalidated by writes.
    pub async fn get_list(&self, query: &ListQuery) -> Result<Vec<Article>, DomainError> {
        if let Some(articles) = self.cache.list(query).await {
            tracing::debug!(page = query.page, limit = query.limit, "Article list served from cache");
            return Ok(articles);
        }

        let articles = self
            .projection
            .list(query)
            .await
            .map_err(DomainError::Storage)?;

        self.cache.put_list(query, &articles).await;
        Ok(articles)
    }
}
