//! In-memory event bus.
//!
//! Works within a single process only. Each subscription gets its own FIFO
//! queue and a task that hands deliveries to the handler one at a time, the
//! same shape as a prefetch-1 AMQP consumer.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};

use articles_core::domain::EXCHANGE;
use articles_core::error::BusError;
use articles_core::ports::{Delivery, EventPublisher, EventSubscriber};

use super::topic::topic_matches;

struct Binding {
    patterns: Vec<String>,
    queue: mpsc::UnboundedSender<Delivery>,
}

/// In-memory topic exchange.
#[derive(Default)]
pub struct InMemoryEventBus {
    bindings: Arc<RwLock<Vec<Binding>>>,
    published: Arc<RwLock<Vec<Delivery>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery published so far, in publish order.
    pub async fn published(&self) -> Vec<Delivery> {
        self.published.read().await.clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<(), BusError> {
        let delivery = Delivery {
            exchange: EXCHANGE.to_string(),
            routing_key: routing_key.to_string(),
            payload: payload.to_vec(),
        };
        self.published.write().await.push(delivery.clone());

        let bindings = self.bindings.read().await;
        let mut routed = 0;
        for binding in bindings.iter() {
            if binding
                .patterns
                .iter()
                .any(|pattern| topic_matches(pattern, routing_key))
                && binding.queue.send(delivery.clone()).is_ok()
            {
                routed += 1;
            }
        }

        if routed == 0 {
            tracing::debug!(routing_key = %routing_key, "No queue bound for routing key");
        }
        Ok(())
    }
}

#[async_trait]
impl EventSubscriber for InMemoryEventBus {
    async fn subscribe<F>(&self, routing_keys: &[&str], handler: F) -> Result<(), BusError>
    where
        F: Fn(Delivery) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Delivery>();
        let patterns: Vec<String> = routing_keys.iter().map(|k| k.to_string()).collect();

        self.bindings.write().await.push(Binding {
            patterns: patterns.clone(),
            queue: tx,
        });

        tokio::spawn(async move {
            tracing::info!(exchange = EXCHANGE, bindings = ?patterns, "Consuming");
            while let Some(delivery) = rx.recv().await {
                handler(delivery).await;
            }
            tracing::info!(exchange = EXCHANGE, "Consumer stopped");
        });

        Ok(())
    }
}
