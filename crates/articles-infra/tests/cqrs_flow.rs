//! End-to-end behaviour of the command side, the bus, the projection applier
//! and the query side, wired together with the in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use articles_core::DomainError;
use articles_core::application::{
    ArticleCommandService, ArticleQueryService, EventDispatcher, ProjectionApplier,
};
use articles_core::cache::{ArticleCache, article_key};
use articles_core::domain::{Article, ArticleEvent, EventKind};
use articles_core::ports::{
    ArticleProjection, Cache, CacheError, EventPublisher, EventSubscriber, ListQuery,
};
use articles_infra::{InMemoryArticleStore, InMemoryCache, InMemoryEventBus, InMemoryProjection};
use async_trait::async_trait;

/// Cache whose writes stall when the value contains `needle`.
struct SlowCache {
    inner: Arc<InMemoryCache>,
    delay: Duration,
    needle: &'static str,
}

#[async_trait]
impl Cache for SlowCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        if !self.delay.is_zero() && value.contains(self.needle) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> bool {
        self.inner.exists(key).await
    }
}

struct System {
    store: Arc<InMemoryArticleStore>,
    bus: Arc<InMemoryEventBus>,
    projection: Arc<InMemoryProjection>,
    cache: Arc<InMemoryCache>,
    commands: ArticleCommandService,
    queries: ArticleQueryService,
    applier: Arc<ProjectionApplier>,
}

impl System {
    async fn start() -> Self {
        Self::with_slow_cache(Duration::ZERO, "").await
    }

    /// Every cache write whose value contains `needle` takes `delay` longer.
    async fn with_slow_cache(delay: Duration, needle: &'static str) -> Self {
        let store = Arc::new(InMemoryArticleStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let projection = Arc::new(InMemoryProjection::new());
        let cache = Arc::new(InMemoryCache::new());
        let shared: Arc<dyn Cache> = Arc::new(SlowCache {
            inner: cache.clone(),
            delay,
            needle,
        });

        let commands =
            ArticleCommandService::new(store.clone(), bus.clone(), ArticleCache::new(shared.clone()));
        let queries = ArticleQueryService::new(projection.clone(), ArticleCache::new(shared.clone()));
        let applier = Arc::new(ProjectionApplier::new(
            projection.clone(),
            ArticleCache::new(shared),
        ));

        let dispatcher = EventDispatcher::new(applier.clone());
        bus.subscribe(&EventKind::routing_keys(), move |delivery| {
            let dispatcher = dispatcher.clone();
            Box::pin(async move { dispatcher.dispatch(delivery).await })
        })
        .await
        .unwrap();

        Self {
            store,
            bus,
            projection,
            cache,
            commands,
            queries,
            applier,
        }
    }

    async fn create(&self, author: &str, title: &str, body: &str) -> Article {
        self.commands
            .store(author.into(), title.into(), body.into())
            .await
            .unwrap()
    }

    /// Wait until the projection document for `uuid` satisfies `check`.
    async fn eventually<F>(&self, uuid: uuid::Uuid, check: F)
    where
        F: Fn(Option<&Article>) -> bool,
    {
        for _ in 0..400 {
            let doc = self.projection.find_by_uuid(uuid).await.unwrap();
            if check(doc.as_ref()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("projection for {uuid} never converged");
    }

    async fn cached(&self, uuid: uuid::Uuid) -> Option<Article> {
        self.cache
            .get(&article_key(&uuid))
            .await
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }
}

#[tokio::test]
async fn create_is_readable_through_the_query_side() {
    let sys = System::start().await;
    let created = sys.create("a", "t", "b").await;
    assert_eq!(created.created_at, created.updated_at);

    sys.eventually(created.uuid, |doc| doc == Some(&created)).await;

    let read = sys.queries.get_single(created.uuid).await.unwrap();
    assert_eq!(read, created);
}

#[tokio::test]
async fn create_prefills_the_cache() {
    let sys = System::start().await;
    let created = sys.create("a", "t", "b").await;

    assert_eq!(sys.cached(created.uuid).await, Some(created));
}

#[tokio::test]
async fn update_bumps_updated_at_everywhere() {
    let sys = System::start().await;
    let created = sys.create("a", "t", "b").await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = sys
        .commands
        .update(created.uuid, "a2".into(), "t2".into(), "b2".into())
        .await
        .unwrap();
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    sys.eventually(updated.uuid, |doc| doc == Some(&updated)).await;
    assert_eq!(sys.cached(updated.uuid).await, Some(updated.clone()));
    assert_eq!(sys.queries.get_single(updated.uuid).await.unwrap(), updated);
}

#[tokio::test]
async fn delete_removes_and_evicts() {
    let sys = System::start().await;
    let created = sys.create("a", "t", "b").await;
    sys.eventually(created.uuid, |doc| doc.is_some()).await;

    let deleted = sys.commands.delete(created.uuid).await.unwrap();
    assert_eq!(deleted, created);

    sys.eventually(created.uuid, |doc| doc.is_none()).await;
    assert!(sys.cached(created.uuid).await.is_none());
    assert!(matches!(
        sys.queries.get_single(created.uuid).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn validation_failure_writes_nothing() {
    let sys = System::start().await;
    let result = sys.commands.store(String::new(), "t".into(), "b".into()).await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert!(sys.store.is_empty().await);
    assert!(sys.bus.published().await.is_empty());
}

#[tokio::test]
async fn unknown_uuid_emits_nothing() {
    let sys = System::start().await;
    let missing = uuid::Uuid::new_v4();

    let update = sys
        .commands
        .update(missing, "a".into(), "t".into(), "b".into())
        .await;
    let delete = sys.commands.delete(missing).await;

    assert!(matches!(update, Err(DomainError::NotFound { .. })));
    assert!(matches!(delete, Err(DomainError::NotFound { .. })));
    assert!(sys.bus.published().await.is_empty());
}

#[tokio::test]
async fn poisoned_deliveries_are_dropped_and_the_queue_moves_on() {
    let sys = System::start().await;
    sys.bus.publish("article.created", b"{not json").await.unwrap();
    sys.bus.publish("article.archived", b"{}").await.unwrap();

    // Processed strictly after the two bad deliveries.
    let created = sys.create("a", "t", "b").await;
    sys.eventually(created.uuid, |doc| doc.is_some()).await;

    assert_eq!(sys.projection.len().await, 1);
}

#[tokio::test]
async fn replaying_any_event_is_harmless() {
    let sys = System::start().await;
    let created = sys.create("a", "t", "b").await;
    sys.eventually(created.uuid, |doc| doc.is_some()).await;

    for kind in EventKind::ALL {
        let article = match kind {
            EventKind::Created => created.clone(),
            _ => sys.store.get(created.uuid).await.unwrap_or(created.clone()),
        };
        let event = ArticleEvent::new(kind, article);
        let payload = event.payload().unwrap();

        sys.applier.apply(&event, &payload).await.unwrap();
        let once = (
            sys.projection.find_by_uuid(created.uuid).await.unwrap(),
            sys.cached(created.uuid).await,
        );
        sys.applier.apply(&event, &payload).await.unwrap();
        let twice = (
            sys.projection.find_by_uuid(created.uuid).await.unwrap(),
            sys.cached(created.uuid).await,
        );
        assert_eq!(once, twice, "{kind} is not idempotent");
    }
}

#[tokio::test]
async fn concurrent_updates_converge_on_the_last_commit() {
    let sys = Arc::new(System::start().await);
    let created = sys.create("a", "t", "b").await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let sys = sys.clone();
        tasks.push(tokio::spawn(async move {
            sys.commands
                .update(created.uuid, format!("a{i}"), format!("t{i}"), "b".into())
                .await
                .unwrap()
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let last = sys.store.get(created.uuid).await.unwrap();
    sys.eventually(created.uuid, |doc| doc == Some(&last)).await;
    assert_eq!(sys.cached(created.uuid).await, Some(last));
}

#[tokio::test]
async fn list_results_are_cached_until_expiry() {
    let sys = System::start().await;
    let first = sys.create("a", "one", "b").await;
    sys.eventually(first.uuid, |doc| doc.is_some()).await;

    let query = ListQuery::default();
    let before = sys.queries.get_list(&query).await.unwrap();
    assert_eq!(before, vec![first]);

    let second = sys.create("a", "two", "b").await;
    sys.eventually(second.uuid, |doc| doc.is_some()).await;

    let after = sys.queries.get_list(&query).await.unwrap();
    assert_eq!(
        serde_json::to_vec(&before).unwrap(),
        serde_json::to_vec(&after).unwrap()
    );

    let fresh = sys.queries.get_list(&ListQuery::new(None, Some(10), None, None)).await.unwrap();
    assert_eq!(fresh.len(), 2);
}

#[tokio::test]
async fn caller_giving_up_after_commit_does_not_lose_the_event() {
    let sys = System::with_slow_cache(Duration::from_millis(200), "").await;

    let attempt = tokio::time::timeout(
        Duration::from_millis(50),
        sys.commands.store("a".into(), "t".into(), "b".into()),
    )
    .await;
    assert!(attempt.is_err());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(sys.store.len().await, 1);
    let published = sys.bus.published().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].routing_key, "article.created");
}

#[tokio::test]
async fn slow_post_commit_work_cannot_reorder_events_for_one_article() {
    let slow_first = System::with_slow_cache(Duration::from_millis(200), r#""title":"first""#);
    let sys = Arc::new(slow_first.await);
    let created = sys.create("a", "t", "b").await;
    let uuid = created.uuid;

    let first = {
        let sys = sys.clone();
        tokio::spawn(async move {
            sys.commands
                .update(uuid, "a".into(), "first".into(), "b".into())
                .await
                .unwrap()
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = sys
        .commands
        .update(uuid, "a".into(), "second".into(), "b".into())
        .await
        .unwrap();
    let first = first.await.unwrap();
    assert!(second.updated_at > first.updated_at);

    let last = sys.store.get(uuid).await.unwrap();
    assert_eq!(last, second);

    let titles: Vec<String> = sys
        .bus
        .published()
        .await
        .into_iter()
        .filter(|d| d.routing_key == "article.updated")
        .map(|d| ArticleEvent::decode(EventKind::Updated, &d.payload).unwrap().article.title)
        .collect();
    assert_eq!(titles, vec!["first", "second"]);

    sys.eventually(uuid, |doc| doc == Some(&last)).await;
    assert_eq!(sys.cached(uuid).await, Some(last));
}
