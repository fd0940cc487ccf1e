//! In-memory projection - mirrors the MongoDB semantics for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use articles_core::domain::Article;
use articles_core::error::RepoError;
use articles_core::ports::{ArticleProjection, InsertOutcome, ListQuery};

#[derive(Default)]
pub struct InMemoryProjection {
    documents: RwLock<HashMap<Uuid, Article>>,
}

impl InMemoryProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl ArticleProjection for InMemoryProjection {
    async fn insert(&self, article: &Article) -> Result<InsertOutcome, RepoError> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&article.uuid) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        documents.insert(article.uuid, article.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn update(&self, article: &Article) -> Result<bool, RepoError> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(&article.uuid) {
            Some(document) => {
                *document = article.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, uuid: Uuid) -> Result<bool, RepoError> {
        Ok(self.documents.write().await.remove(&uuid).is_some())
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Article>, RepoError> {
        Ok(self.documents.read().await.get(&uuid).cloned())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Article>, RepoError> {
        let documents = self.documents.read().await;
        let mut matching: Vec<Article> = documents
            .values()
            .filter(|article| query.matches(article))
            .cloned()
            .collect();
        // Ties on created_at fall back to uuid so pages stay deterministic.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.uuid.cmp(&b.uuid))
        });

        Ok(matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn article_at(minutes_ago: i64, author: &str) -> Article {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        Article {
            uuid: Uuid::new_v4(),
            author: author.into(),
            title: format!("written {minutes_ago} minutes ago"),
            body: "b".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paginated() {
        let projection = InMemoryProjection::new();
        for minutes in [30, 10, 20] {
            projection.insert(&article_at(minutes, "ann")).await.unwrap();
        }

        let first = projection
            .list(&ListQuery::new(Some(1), Some(2), None, None))
            .await
            .unwrap();
        let titles: Vec<_> = first.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["written 10 minutes ago", "written 20 minutes ago"]);

        let second = projection
            .list(&ListQuery::new(Some(2), Some(2), None, None))
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "written 30 minutes ago");
    }

    #[tokio::test]
    async fn list_applies_author_filter() {
        let projection = InMemoryProjection::new();
        projection.insert(&article_at(1, "ann")).await.unwrap();
        projection.insert(&article_at(2, "bob")).await.unwrap();

        let only_bob = projection
            .list(&ListQuery::new(None, None, None, Some("bob".into())))
            .await
            .unwrap();
        assert_eq!(only_bob.len(), 1);
        assert_eq!(only_bob[0].author, "bob");
    }

    #[tokio::test]
    async fn second_insert_reports_existing_document() {
        let projection = InMemoryProjection::new();
        let article = article_at(0, "ann");
        assert_eq!(
            projection.insert(&article).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            projection.insert(&article).await.unwrap(),
            InsertOutcome::AlreadyExists
        );
        assert_eq!(projection.len().await, 1);
    }
}
