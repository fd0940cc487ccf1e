//! # Articles Infrastructure
//!
//! Concrete implementations of the ports defined in `articles-core`:
//! the authoritative store, the projection store, the event bus and the
//! cache, each with an in-memory fallback.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - Authoritative store on PostgreSQL via SeaORM
//! - `mongo` - Projection store on MongoDB
//! - `amqp` - Event bus on an AMQP topic exchange
//! - `redis` - Redis cache

pub mod bus;
pub mod cache;
pub mod database;
pub mod projection;
pub mod retry;

// Re-exports - In-Memory
pub use bus::InMemoryEventBus;
pub use cache::InMemoryCache;
pub use database::InMemoryArticleStore;
pub use projection::InMemoryProjection;
pub use retry::{RetryPolicy, connect_with_retry};

// Re-exports - External services
#[cfg(feature = "amqp")]
pub use bus::{AmqpConfig, AmqpEventBus};
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresArticleStore};
#[cfg(feature = "mongo")]
pub use projection::{MongoConfig, MongoProjection};
