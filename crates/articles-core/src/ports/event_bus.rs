//! Event bus ports - publishing on the command side, consuming on the query side.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

use crate::error::BusError;

/// A message received from the bus.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub exchange: String,
    pub routing_key: String,
    pub payload: Vec<u8>,
}

/// Publishing half of the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one message to the articles exchange under `routing_key`.
    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<(), BusError>;
}

/// Consuming half of the bus.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Bind the consumer queue to every key in `routing_keys` and start
    /// delivering to `handler`, one delivery at a time, in receive order.
    ///
    /// Each delivery is acknowledged once the handler's future completes.
    /// Returns once the consumer is registered; the loop itself runs in a
    /// background task.
    async fn subscribe<F>(&self, routing_keys: &[&str], handler: F) -> Result<(), BusError>
    where
        F: Fn(Delivery) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static;
}
