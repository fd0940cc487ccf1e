use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Article entity - the single aggregate of the system.
///
/// The uuid is the only identity shared between the authoritative store and
/// the projection; store-local row ids never leave the adapter that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub uuid: Uuid,
    pub author: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated article that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub uuid: Uuid,
    pub author: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewArticle {
    /// Create a new article with a fresh uuid and both timestamps set to now.
    pub fn new(author: String, title: String, body: String) -> Result<Self, DomainError> {
        ensure_content(&author, &title, &body)?;
        let now = now();
        Ok(Self {
            uuid: Uuid::new_v4(),
            author,
            title,
            body,
            created_at: now,
            updated_at: now,
        })
    }
}

/// New content for an existing article. `created_at` is never part of it.
#[derive(Debug, Clone)]
pub struct ArticleChanges {
    pub author: String,
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

impl ArticleChanges {
    pub fn new(author: String, title: String, body: String) -> Result<Self, DomainError> {
        ensure_content(&author, &title, &body)?;
        Ok(Self {
            author,
            title,
            body,
            updated_at: now(),
        })
    }
}

/// Server time at millisecond precision, the coarsest precision any store
/// keeps, so every copy of an article carries identical timestamps.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn ensure_content(author: &str, title: &str, body: &str) -> Result<(), DomainError> {
    let missing: Vec<&str> = [("author", author), ("title", title), ("body", body)]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "{} must not be empty",
            missing.join(", ")
        )))
    }
}

/// Parse an externally supplied uuid, rejecting malformed input as a validation error.
pub fn parse_uuid(raw: &str) -> Result<Uuid, DomainError> {
    if raw.is_empty() {
        return Err(DomainError::Validation("uuid must not be empty".to_string()));
    }
    Uuid::parse_str(raw).map_err(|_| DomainError::Validation(format!("invalid uuid: {raw}")))
}
