//! Read-side event handling: dispatch deliveries by routing key and apply
//! each event to the projection and the shared cache.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::ArticleCache;
use crate::domain::{ArticleEvent, EventKind};
use crate::error::RepoError;
use crate::ports::{ArticleProjection, Delivery, InsertOutcome};

/// Upper bound on applying a single event.
pub const APPLY_TIMEOUT: Duration = Duration::from_secs(15);

/// Applies article events to the projection store.
///
/// Every handler is idempotent: create tolerates an existing document,
/// update tolerates a missing one, delete tolerates a missing one.
pub struct ProjectionApplier {
    projection: Arc<dyn ArticleProjection>,
    cache: ArticleCache,
}

impl ProjectionApplier {
    pub fn new(projection: Arc<dyn ArticleProjection>, cache: ArticleCache) -> Self {
        Self { projection, cache }
    }

    /// Apply one event. `payload` is the raw event body, written to the
    /// by-uuid cache entry as-is so the cache holds the committed post-state.
    pub async fn apply(&self, event: &ArticleEvent, payload: &[u8]) -> Result<(), RepoError> {
        match event.kind {
            EventKind::Created => self.apply_create(event, payload).await,
            EventKind::Updated => self.apply_update(event, payload).await,
            EventKind::Deleted => self.apply_delete(event).await,
        }
    }

    async fn apply_create(&self, event: &ArticleEvent, payload: &[u8]) -> Result<(), RepoError> {
        let article = &event.article;
        match self.projection.insert(article).await? {
            InsertOutcome::Inserted => {
                self.cache_payload(event, payload).await;
                tracing::info!(uuid = %article.uuid, "Projection document inserted");
            }
            InsertOutcome::AlreadyExists => {
                tracing::debug!(uuid = %article.uuid, "Create replayed, document already present");
            }
        }
        Ok(())
    }

    async fn apply_update(&self, event: &ArticleEvent, payload: &[u8]) -> Result<(), RepoError> {
        let article = &event.article;
        self.cache_payload(event, payload).await;
        if self.projection.update(article).await? {
            tracing::info!(uuid = %article.uuid, "Projection document updated");
        } else {
            tracing::warn!(uuid = %article.uuid, "Update for unknown document ignored");
        }
        Ok(())
    }

    async fn apply_delete(&self, event: &ArticleEvent) -> Result<(), RepoError> {
        let uuid = event.article.uuid;
        self.cache.evict_article(&uuid).await;
        if self.projection.delete(uuid).await? {
            tracing::info!(uuid = %uuid, "Projection document deleted");
        } else {
            tracing::debug!(uuid = %uuid, "Delete for unknown document ignored");
        }
        Ok(())
    }

    async fn cache_payload(&self, event: &ArticleEvent, payload: &[u8]) {
        match std::str::from_utf8(payload) {
            Ok(json) => self.cache.put_article_json(&event.article.uuid, json).await,
            Err(_) => self.cache.put_article(&event.article).await,
        }
    }
}

/// Routes deliveries to the projection applier.
///
/// A delivery is never rejected: unknown routing keys, undecodable payloads
/// and handler failures are logged and the delivery is acknowledged.
#[derive(Clone)]
pub struct EventDispatcher {
    applier: Arc<ProjectionApplier>,
    timeout: Duration,
}

impl EventDispatcher {
    pub fn new(applier: Arc<ProjectionApplier>) -> Self {
        Self {
            applier,
            timeout: APPLY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn dispatch(&self, delivery: Delivery) {
        tracing::debug!(
            exchange = %delivery.exchange,
            routing_key = %delivery.routing_key,
            "Delivery received"
        );

        let kind: EventKind = match delivery.routing_key.parse() {
            Ok(kind) => kind,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding delivery");
                return;
            }
        };

        let event = match ArticleEvent::decode(kind, &delivery.payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(
                    routing_key = %kind,
                    error = %e,
                    payload = %String::from_utf8_lossy(&delivery.payload),
                    "Discarding undecodable delivery"
                );
                return;
            }
        };

        match tokio::time::timeout(self.timeout, self.applier.apply(&event, &delivery.payload))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(
                uuid = %event.article.uuid,
                routing_key = %kind,
                error = %e,
                "Projection apply failed; delivery dropped"
            ),
            Err(_) => tracing::error!(
                uuid = %event.article.uuid,
                routing_key = %kind,
                timeout_secs = self.timeout.as_secs(),
                "Projection apply timed out; delivery dropped"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Article, EXCHANGE};
    use crate::ports::{Cache, CacheError, ListQuery};
    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    /// Records inserts; hangs or fails for chosen uuids.
    #[derive(Default)]
    struct FlakyProjection {
        hangs_on: Option<Uuid>,
        fails_on: Option<Uuid>,
        inserted: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl ArticleProjection for FlakyProjection {
        async fn insert(&self, article: &Article) -> Result<InsertOutcome, RepoError> {
            if self.hangs_on == Some(article.uuid) {
                std::future::pending::<()>().await;
            }
            if self.fails_on == Some(article.uuid) {
                return Err(RepoError::Query("projection unavailable".into()));
            }
            self.inserted.lock().await.push(article.uuid);
            Ok(InsertOutcome::Inserted)
        }

        async fn update(&self, _article: &Article) -> Result<bool, RepoError> {
            Ok(false)
        }

        async fn delete(&self, _uuid: Uuid) -> Result<bool, RepoError> {
            Ok(false)
        }

        async fn find_by_uuid(&self, _uuid: Uuid) -> Result<Option<Article>, RepoError> {
            Ok(None)
        }

        async fn list(&self, _query: &ListQuery) -> Result<Vec<Article>, RepoError> {
            Ok(Vec::new())
        }
    }

    struct NoCache;

    #[async_trait]
    impl Cache for NoCache {
        async fn get(&self, _key: &str) -> Option<String> {
            None
        }

        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<Duration>,
        ) -> Result<(), CacheError> {
            Ok(())
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Ok(())
        }

        async fn exists(&self, _key: &str) -> bool {
            false
        }
    }

    fn article() -> Article {
        let now = chrono::Utc::now();
        Article {
            uuid: Uuid::new_v4(),
            author: "a".into(),
            title: "t".into(),
            body: "b".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn created(article: &Article) -> Delivery {
        let event = ArticleEvent::new(EventKind::Created, article.clone());
        Delivery {
            exchange: EXCHANGE.into(),
            routing_key: EventKind::Created.routing_key().into(),
            payload: event.payload().unwrap(),
        }
    }

    fn dispatcher(projection: Arc<FlakyProjection>) -> EventDispatcher {
        let applier = ProjectionApplier::new(projection, ArticleCache::new(Arc::new(NoCache)));
        EventDispatcher::new(Arc::new(applier)).with_timeout(Duration::from_millis(50))
    }

    #[tokio::test]
    async fn hanging_apply_is_abandoned_after_the_timeout() {
        let stuck = article();
        let next = article();
        let projection = Arc::new(FlakyProjection {
            hangs_on: Some(stuck.uuid),
            ..Default::default()
        });
        let dispatcher = dispatcher(projection.clone());

        tokio::time::timeout(Duration::from_secs(1), dispatcher.dispatch(created(&stuck)))
            .await
            .expect("dispatch should give up on a hanging apply");
        dispatcher.dispatch(created(&next)).await;

        assert_eq!(*projection.inserted.lock().await, vec![next.uuid]);
    }

    #[tokio::test]
    async fn failed_apply_does_not_block_later_deliveries() {
        let broken = article();
        let next = article();
        let projection = Arc::new(FlakyProjection {
            fails_on: Some(broken.uuid),
            ..Default::default()
        });
        let dispatcher = dispatcher(projection.clone());

        dispatcher.dispatch(created(&broken)).await;
        dispatcher.dispatch(created(&next)).await;

        assert_eq!(*projection.inserted.lock().await, vec![next.uuid]);
    }

    #[tokio::test]
    async fn unroutable_and_undecodable_deliveries_are_discarded() {
        let projection = Arc::new(FlakyProjection::default());
        let dispatcher = dispatcher(projection.clone());

        let mut unknown = created(&article());
        unknown.routing_key = "article.archived".into();
        dispatcher.dispatch(unknown).await;

        let mut garbled = created(&article());
        garbled.payload = b"{not json".to_vec();
        dispatcher.dispatch(garbled).await;

        assert!(projection.inserted.lock().await.is_empty());
    }
}
