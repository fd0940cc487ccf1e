//! AMQP event bus on a durable topic exchange.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};

use articles_core::domain::EXCHANGE;
use articles_core::error::BusError;
use articles_core::ports::{Delivery, EventPublisher, EventSubscriber};

use crate::retry::{RetryPolicy, connect_with_retry};

const CONTENT_TYPE: &str = "application/json";

/// AMQP connection configuration.
#[derive(Debug, Clone)]
pub struct AmqpConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub exchange: String,
    /// Durable queue the query service consumes from.
    pub queue: String,
    pub prefetch: u16,
}

impl Default for AmqpConfig {
    fn default() -> Self {
        Self {
            user: "guest".to_string(),
            password: "guest".to_string(),
            host: "localhost".to_string(),
            port: 5672,
            exchange: EXCHANGE.to_string(),
            queue: EXCHANGE.to_string(),
            prefetch: 1,
        }
    }
}

impl AmqpConfig {
    /// Load configuration from the `AMQP_*` variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            user: std::env::var("AMQP_USER").unwrap_or(defaults.user),
            password: std::env::var("AMQP_PASSWORD").unwrap_or(defaults.password),
            host: std::env::var("AMQP_HOST").unwrap_or(defaults.host),
            port: std::env::var("AMQP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            ..defaults
        }
    }

    pub fn url(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}/%2f",
            self.user, self.password, self.host, self.port
        )
    }
}

/// Event bus backed by one AMQP connection.
///
/// Publishing opens a short-lived channel per event and re-declares the
/// exchange on it; consuming holds one long-lived channel per subscription.
pub struct AmqpEventBus {
    connection: Arc<Connection>,
    config: AmqpConfig,
}

impl AmqpEventBus {
    /// Connect and declare the exchange.
    pub async fn new(config: AmqpConfig) -> Result<Self, BusError> {
        let connection = Connection::connect(&config.url(), ConnectionProperties::default())
            .await
            .map_err(|e| BusError::Connection(e.to_string()))?;

        let bus = Self {
            connection: Arc::new(connection),
            config,
        };
        let channel = bus.channel().await?;
        bus.declare_exchange(&channel).await?;
        close_channel(&channel, "setup complete").await;

        tracing::info!(
            host = %bus.config.host,
            exchange = %bus.config.exchange,
            "Connected to AMQP broker"
        );
        Ok(bus)
    }

    /// Connect with the startup retry policy.
    pub async fn connect(config: AmqpConfig, policy: RetryPolicy) -> Result<Self, BusError> {
        connect_with_retry("amqp", policy, || Self::new(config.clone())).await
    }

    async fn channel(&self) -> Result<Channel, BusError> {
        self.connection
            .create_channel()
            .await
            .map_err(|e| BusError::Connection(e.to_string()))
    }

    /// Durable, non-auto-delete topic exchange. Idempotent.
    async fn declare_exchange(&self, channel: &Channel) -> Result<(), BusError> {
        channel
            .exchange_declare(
                &self.config.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    auto_delete: false,
                    internal: false,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Topology(e.to_string()))
    }
}

#[async_trait]
impl EventPublisher for AmqpEventBus {
    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<(), BusError> {
        let channel = self.channel().await?;
        self.declare_exchange(&channel).await?;

        tracing::debug!(
            exchange = %self.config.exchange,
            routing_key = %routing_key,
            bytes = payload.len(),
            "Publishing"
        );

        // No publisher confirms: the returned confirm resolves immediately.
        let result = channel
            .basic_publish(
                &self.config.exchange,
                routing_key,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_content_type(CONTENT_TYPE.into()),
            )
            .await
            .map_err(|e| BusError::Publish(e.to_string()));

        close_channel(&channel, "published").await;
        result.map(|_confirm| ())
    }
}

/// Close a short-lived channel. The work on it is already done, so a failed
/// close is only logged.
async fn close_channel(channel: &Channel, reason: &str) {
    if let Err(e) = channel.close(200, reason).await {
        tracing::debug!(
            channel = channel.id(),
            reason = %reason,
            error = %e,
            "Closing channel failed"
        );
    }
}

#[async_trait]
impl EventSubscriber for AmqpEventBus {
    async fn subscribe<F>(&self, routing_keys: &[&str], handler: F) -> Result<(), BusError>
    where
        F: Fn(Delivery) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static,
    {
        let channel = self.channel().await?;
        self.declare_exchange(&channel).await?;

        let queue = channel
            .queue_declare(
                &self.config.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Topology(e.to_string()))?;

        channel
            .basic_qos(self.config.prefetch, BasicQosOptions::default())
            .await
            .map_err(|e| BusError::Subscribe(e.to_string()))?;

        for routing_key in routing_keys {
            channel
                .queue_bind(
                    queue.name().as_str(),
                    &self.config.exchange,
                    routing_key,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await
                .map_err(|e| BusError::Topology(e.to_string()))?;
        }

        let mut consumer = channel
            .basic_consume(
                queue.name().as_str(),
                "",
                BasicConsumeOptions {
                    no_ack: false,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Subscribe(e.to_string()))?;

        let exchange = self.config.exchange.clone();
        let queue_name = queue.name().to_string();
        tracing::info!(exchange = %exchange, queue = %queue_name, bindings = ?routing_keys, "Waiting for messages");

        let connection = self.connection.clone();
        tokio::spawn(async move {
            // The consumer owns its channel and a handle on the connection.
            let _keepalive = (connection, channel);

            while let Some(next) = consumer.next().await {
                let amqp_delivery = match next {
                    Ok(delivery) => delivery,
                    Err(e) => {
                        tracing::error!(queue = %queue_name, error = %e, "Consumer stream failed");
                        break;
                    }
                };

                let delivery = Delivery {
                    exchange: amqp_delivery.exchange.as_str().to_string(),
                    routing_key: amqp_delivery.routing_key.as_str().to_string(),
                    payload: amqp_delivery.data.clone(),
                };
                handler(delivery).await;

                if let Err(e) = amqp_delivery.acker.ack(BasicAckOptions::default()).await {
                    tracing::error!(queue = %queue_name, error = %e, "Ack failed");
                }
            }

            tracing::warn!(exchange = %exchange, queue = %queue_name, "Consumer stopped");
        });

        Ok(())
    }
}
