//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use articles_core::application::ArticleQueryService;
use articles_core::cache::ArticleCache;
use articles_core::ports::{ArticleProjection, Cache};
#[cfg(any(feature = "mongo", feature = "amqp", feature = "redis"))]
use articles_infra::RetryPolicy;

use crate::config::AppConfig;
#[cfg(feature = "amqp")]
use crate::consumer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub queries: Arc<ArticleQueryService>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        projection: Arc<dyn ArticleProjection>,
        cache: ArticleCache,
        request_timeout: Duration,
    ) -> Self {
        Self {
            queries: Arc::new(ArticleQueryService::new(projection, cache)),
            request_timeout,
        }
    }

    /// Connect the projection, the cache and the bus, start the consumer,
    /// and build the state the handlers read from.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        #[cfg(feature = "mongo")]
        let projection: Arc<dyn ArticleProjection> = Arc::new(
            articles_infra::MongoProjection::connect(&config.mongo, RetryPolicy::default())
                .await?,
        );
        #[cfg(not(feature = "mongo"))]
        let projection: Arc<dyn ArticleProjection> = {
            tracing::warn!("mongo feature disabled - using in-memory projection");
            Arc::new(articles_infra::InMemoryProjection::new())
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
        let cache = ArticleCache::new(cache);

        let consuming = start_event_consumer(config, projection.clone(), cache.clone()).await?;

        tracing::info!(consuming, "Application state initialized");
        Ok(Self::new(projection, cache, config.request_timeout))
    }
}

/// Connect the bus and start feeding the projection. Returns whether a
/// consumer is running.
#[cfg(feature = "amqp")]
async fn start_event_consumer(
    config: &AppConfig,
    projection: Arc<dyn ArticleProjection>,
    cache: ArticleCache,
) -> anyhow::Result<bool> {
    let bus =
        articles_infra::AmqpEventBus::connect(config.amqp.clone(), RetryPolicy::default()).await?;
    consumer::start(&bus, projection, cache).await?;
    Ok(true)
}

#[cfg(not(feature = "amqp"))]
async fn start_event_consumer(
    _config: &AppConfig,
    _projection: Arc<dyn ArticleProjection>,
    _cache: ArticleCache,
) -> anyhow::Result<bool> {
    tracing::warn!("amqp feature disabled - no event consumer started, projection is read-only");
    Ok(false)
}

#[cfg(all(test, not(feature = "amqp")))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_consumer_is_started_without_a_broker() {
        let projection: Arc<dyn ArticleProjection> =
            Arc::new(articles_infra::InMemoryProjection::new());
        let cache = ArticleCache::new(Arc::new(articles_infra::InMemoryCache::new()));

        let consuming = start_event_consumer(&AppConfig::from_env(), projection, cache)
            .await
            .unwrap();
        assert!(!consuming);
    }
}
