//! Event bus implementations - AMQP topic exchange and in-memory.

mod memory;
mod topic;

pub use memory::InMemoryEventBus;
pub use topic::topic_matches;

#[cfg(feature = "amqp")]
mod amqp;
#[cfg(feature = "amqp")]
pub use amqp::{AmqpConfig, AmqpEventBus};
