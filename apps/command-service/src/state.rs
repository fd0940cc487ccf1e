//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use articles_core::application::ArticleCommandService;
use articles_core::cache::ArticleCache;
use articles_core::ports::{ArticleStore, Cache, EventPublisher};
#[cfg(any(feature = "postgres", feature = "amqp", feature = "redis"))]
use articles_infra::RetryPolicy;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub commands: Arc<ArticleCommandService>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        publisher: Arc<dyn EventPublisher>,
        cache: Arc<dyn Cache>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            commands: Arc::new(ArticleCommandService::new(
                store,
                publisher,
                ArticleCache::new(cache),
            )),
            request_timeout,
        }
    }

    /// Connect every backing service enabled at compile time; the rest fall
    /// back to in-memory adapters.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        #[cfg(feature = "postgres")]
        let store: Arc<dyn ArticleStore> = {
            let db = articles_infra::database::connect(&config.database, RetryPolicy::default())
                .await?;
            Arc::new(articles_infra::PostgresArticleStore::new(db))
        };
        #[cfg(not(feature = "postgres"))]
        let store: Arc<dyn ArticleStore> = {
            tracing::warn!("postgres feature disabled - using in-memory article store");
            Arc::new(articles_infra::InMemoryArticleStore::new())
        };

        #[cfg(feature = "amqp")]
        let publisher: Arc<dyn EventPublisher> = Arc::new(
            articles_infra::AmqpEventBus::connect(config.amqp.clone(), RetryPolicy::default())
                .await?,
        );
        #[cfg(not(feature = "amqp"))]
        let publisher: Arc<dyn EventPublisher> = {
            tracing::warn!("amqp feature disabled - events stay in process");
            Arc::new(articles_infra::InMemoryEventBus::new())
        };

        #[cfg(feature = "redis")]
        let cache: Arc<dyn Cache> = Arc::new(
            articles_infra::RedisCache::connect(&config.redis, RetryPolicy::default()).await?,
        );
        #[cfg(not(feature = "redis"))]
        let cache: Arc<dyn Cache> = {
            tracing::warn!("redis feature disabled - using in-memory cache");
            Arc::new(articles_infra::InMemoryCache::new())
        };

        tracing::info!("Application state initialized");
        Ok(Self::new(store, publisher, cache, config.request_timeout))
    }
}
