//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod event_bus;
mod projection;
mod store;

pub use cache::{Cache, CacheError};
pub use event_bus::{Delivery, EventPublisher, EventSubscriber};
pub use projection::{ArticleProjection, InsertOutcome, ListQuery};
pub use store::ArticleStore;
