//! Authoritative article store.

mod memory;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres_store;

pub use memory::InMemoryArticleStore;

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, connect};
#[cfg(feature = "postgres")]
pub use postgres_store::PostgresArticleStore;

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
