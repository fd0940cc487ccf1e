//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity_type} with uuid {id} not found")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Storage failure: {0}")]
    Storage(#[source] RepoError),

    #[error("Event publication failed: {0}")]
    Publish(#[from] BusError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn article_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Article",
            id: id.to_string(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Event bus errors.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Failed to declare topology: {0}")]
    Topology(String),

    #[error("Failed to publish: {0}")]
    Publish(String),

    #[error("Failed to subscribe: {0}")]
    Subscribe(String),
}
