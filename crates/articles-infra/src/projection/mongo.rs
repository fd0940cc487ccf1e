//! MongoDB projection store.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Document, doc};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, Credential, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use articles_core::domain::Article;
use articles_core::error::RepoError;
use articles_core::ports::{ArticleProjection, InsertOutcome, ListQuery};

use crate::retry::{RetryPolicy, connect_with_retry};

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB connection configuration.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub collection: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            username: None,
            password: None,
            database: "articles".to_string(),
            collection: "articles".to_string(),
        }
    }
}

impl MongoConfig {
    /// Load configuration from `MONGO_URL`, `MONGO_USERNAME` and `MONGO_PASSWORD`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("MONGO_URL").unwrap_or(defaults.url),
            username: std::env::var("MONGO_USERNAME").ok().filter(|u| !u.is_empty()),
            password: std::env::var("MONGO_PASSWORD").ok().filter(|p| !p.is_empty()),
            ..defaults
        }
    }
}

/// Stored shape of an article. `_id` is Mongo's own and is never exposed;
/// it is left unset on insert so the server assigns it.
#[derive(Debug, Serialize, Deserialize)]
struct ArticleDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    uuid: String,
    author: String,
    title: String,
    body: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

impl From<&Article> for ArticleDocument {
    fn from(article: &Article) -> Self {
        Self {
            id: None,
            uuid: article.uuid.to_string(),
            author: article.author.clone(),
            title: article.title.clone(),
            body: article.body.clone(),
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

impl TryFrom<ArticleDocument> for Article {
    type Error = RepoError;

    fn try_from(document: ArticleDocument) -> Result<Self, Self::Error> {
        let uuid = Uuid::parse_str(&document.uuid)
            .map_err(|e| RepoError::Query(format!("invalid uuid {:?}: {e}", document.uuid)))?;
        Ok(Self {
            uuid,
            author: document.author,
            title: document.title,
            body: document.body,
            created_at: document.created_at,
            updated_at: document.updated_at,
        })
    }
}

pub struct MongoProjection {
    collection: Collection<ArticleDocument>,
}

impl MongoProjection {
    /// Connect, verify the server answers, and ensure the indexes exist.
    pub async fn new(config: &MongoConfig) -> Result<Self, RepoError> {
        let mut options = ClientOptions::parse(&config.url)
            .await
            .map_err(connection_error)?;
        if let Some(username) = &config.username {
            options.credential = Some(
                Credential::builder()
                    .username(username.clone())
                    .password(config.password.clone())
                    .build(),
            );
        }

        let client = Client::with_options(options).map_err(connection_error)?;
        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(connection_error)?;

        let projection = Self {
            collection: database.collection(&config.collection),
        };
        projection.ensure_indexes().await?;

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Connected to MongoDB projection"
        );
        Ok(projection)
    }

    /// Connect with the startup retry policy.
    pub async fn connect(config: &MongoConfig, policy: RetryPolicy) -> Result<Self, RepoError> {
        connect_with_retry("mongodb", policy, || Self::new(config)).await
    }

    /// The unique uuid index is what turns a replayed create into a
    /// duplicate-key error instead of a second document.
    async fn ensure_indexes(&self) -> Result<(), RepoError> {
        let indexes = [
            IndexModel::builder()
                .keys(doc! { "uuid": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .build(),
        ];
        self.collection
            .create_indexes(indexes)
            .await
            .map_err(query_error)?;
        Ok(())
    }
}

fn connection_error(err: MongoError) -> RepoError {
    RepoError::Connection(err.to_string())
}

fn query_error(err: MongoError) -> RepoError {
    RepoError::Query(err.to_string())
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

fn uuid_filter(uuid: &Uuid) -> Document {
    doc! { "uuid": uuid.to_string() }
}

/// Escape regex metacharacters so the free-text query matches literally.
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn list_filter(query: &ListQuery) -> Document {
    let mut filter = Document::new();
    if !query.author.is_empty() {
        filter.insert("author", query.author.clone());
    }
    if !query.query.is_empty() {
        let pattern = escape_regex(&query.query);
        filter.insert(
            "$or",
            vec![
                doc! { "title": { "$regex": pattern.clone(), "$options": "i" } },
                doc! { "body": { "$regex": pattern, "$options": "i" } },
            ],
        );
    }
    filter
}

#[async_trait]
impl ArticleProjection for MongoProjection {
    async fn insert(&self, article: &Article) -> Result<InsertOutcome, RepoError> {
        match self.collection.insert_one(ArticleDocument::from(article)).await {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if is_duplicate_key(&e) => Ok(InsertOutcome::AlreadyExists),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn update(&self, article: &Article) -> Result<bool, RepoError> {
        let update = doc! {
            "$set": {
                "author": article.author.clone(),
                "title": article.title.clone(),
                "body": article.body.clone(),
                "created_at": bson::DateTime::from_chrono(article.created_at),
                "updated_at": bson::DateTime::from_chrono(article.updated_at),
            }
        };
        let result = self
            .collection
            .update_one(uuid_filter(&article.uuid), update)
            .await
            .map_err(query_error)?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, uuid: Uuid) -> Result<bool, RepoError> {
        let result = self
            .collection
            .delete_one(uuid_filter(&uuid))
            .await
            .map_err(query_error)?;
        Ok(result.deleted_count > 0)
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Article>, RepoError> {
        self.collection
            .find_one(uuid_filter(&uuid))
            .await
            .map_err(query_error)?
            .map(Article::try_from)
            .transpose()
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Article>, RepoError> {
        let cursor = self
            .collection
            .find(list_filter(query))
            .sort(doc! { "created_at": -1, "uuid": 1 })
            .skip(query.offset())
            .limit(i64::try_from(query.limit).unwrap_or(i64::MAX))
            .await
            .map_err(query_error)?;
        let documents: Vec<ArticleDocument> = cursor.try_collect().await.map_err(query_error)?;

        Ok(documents
            .into_iter()
            .filter_map(|document| match Article::try_from(document) {
                Ok(article) => Some(article),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping undecodable projection document");
                    None
                }
            })
            .collect())
    }
}
