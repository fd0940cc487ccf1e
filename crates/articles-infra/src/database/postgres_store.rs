//! PostgreSQL implementation of the authoritative store.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbConn, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use articles_core::domain::{Article, ArticleChanges, NewArticle};
use articles_core::error::RepoError;
use articles_core::ports::ArticleStore;

use super::entity::article::{self, Entity as ArticleEntity};

/// Articles in Postgres. Each mutation is one transaction; the returned
/// article is the row as written inside that transaction.
pub struct PostgresArticleStore {
    db: DbConn,
}

impl PostgresArticleStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn begin(&self) -> Result<DatabaseTransaction, RepoError> {
        self.db
            .begin()
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))
    }

    /// Select the row for `uuid` and hold its lock until the transaction ends.
    async fn lock_row(
        txn: &DatabaseTransaction,
        uuid: Uuid,
    ) -> Result<article::Model, RepoError> {
        ArticleEntity::find()
            .filter(article::Column::Uuid.eq(uuid))
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(query_error)?
            .ok_or(RepoError::NotFound)
    }
}

fn query_error(err: DbErr) -> RepoError {
    let msg = err.to_string();
    if msg.contains("duplicate") || msg.contains("unique") {
        RepoError::Constraint(msg)
    } else {
        RepoError::Query(msg)
    }
}

#[async_trait]
impl ArticleStore for PostgresArticleStore {
    async fn insert(&self, new_article: NewArticle) -> Result<Article, RepoError> {
        let txn = self.begin().await?;

        let active: article::ActiveModel = new_article.into();
        let model = active.insert(&txn).await.map_err(query_error)?;

        txn.commit().await.map_err(query_error)?;
        Ok(model.into())
    }

    async fn update(&self, uuid: Uuid, changes: ArticleChanges) -> Result<Article, RepoError> {
        let txn = self.begin().await?;

        let mut active: article::ActiveModel = Self::lock_row(&txn, uuid).await?.into();
        active.author = Set(changes.author);
        active.title = Set(changes.title);
        active.body = Set(changes.body);
        active.updated_at = Set(changes.updated_at.into());
        let model = active.update(&txn).await.map_err(query_error)?;

        txn.commit().await.map_err(query_error)?;
        Ok(model.into())
    }

    async fn delete(&self, uuid: Uuid) -> Result<Article, RepoError> {
        let txn = self.begin().await?;

        let model = Self::lock_row(&txn, uuid).await?;
        ArticleEntity::delete_many()
            .filter(article::Column::Uuid.eq(uuid))
            .exec(&txn)
            .await
            .map_err(query_error)?;

        txn.commit().await.map_err(query_error)?;
        Ok(model.into())
    }
}
