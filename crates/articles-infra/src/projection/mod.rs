//! Projection store implementations - MongoDB and in-memory.

mod memory;

pub use memory::InMemoryProjection;

#[cfg(feature = "mongo")]
mod mongo;
#[cfg(feature = "mongo")]
pub use mongo::{MongoConfig, MongoProjection};
