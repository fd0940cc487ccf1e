#[cfg(test)]
mod tests {
    use crate::database::entity::article;
    use crate::database::postgres_store::PostgresArticleStore;
    use articles_core::domain::{ArticleChanges, NewArticle};
    use articles_core::error::RepoError;
    use articles_core::ports::ArticleStore;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn row(uuid: uuid::Uuid, title: &str) -> article::Model {
        let now = chrono::Utc::now();
        article::Model {
            id: 7,
            uuid,
            author: "ann".to_owned(),
            title: title.to_owned(),
            body: "body".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn insert_returns_the_written_row() {
        let new_article = NewArticle::new("ann".into(), "First".into(), "body".into()).unwrap();
        let uuid = new_article.uuid;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(uuid, "First")]])
            .into_connection();
        let store = PostgresArticleStore::new(db);

        let article = store.insert(new_article).await.unwrap();
        assert_eq!(article.uuid, uuid);
        assert_eq!(article.title, "First");
    }

    #[tokio::test]
    async fn update_of_unknown_uuid_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<article::Model>::new()])
            .into_connection();
        let store = PostgresArticleStore::new(db);

        let changes = ArticleChanges::new("a".into(), "t".into(), "b".into()).unwrap();
        let err = store.update(uuid::Uuid::new_v4(), changes).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn delete_returns_the_row_as_it_was() {
        let uuid = uuid::Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(uuid, "Doomed")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let store = PostgresArticleStore::new(db);

        let deleted = store.delete(uuid).await.unwrap();
        assert_eq!(deleted.uuid, uuid);
        assert_eq!(deleted.title, "Doomed");
    }
}
