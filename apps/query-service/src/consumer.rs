//! Background event consumer feeding the projection.

use std::sync::Arc;

use articles_core::application::{EventDispatcher, ProjectionApplier};
use articles_core::cache::ArticleCache;
use articles_core::domain::EventKind;
use articles_core::error::BusError;
use articles_core::ports::{ArticleProjection, EventSubscriber};

/// Bind every article routing key and start dispatching deliveries to the
/// projection applier. Returns once the consumer is registered.
pub async fn start<S>(
    subscriber: &S,
    projection: Arc<dyn ArticleProjection>,
    cache: ArticleCache,
) -> Result<(), BusError>
where
    S: EventSubscriber,
{
    let dispatcher = EventDispatcher::new(Arc::new(ProjectionApplier::new(projection, cache)));

    subscriber
        .subscribe(&EventKind::routing_keys(), move |delivery| {
            let dispatcher = dispatcher.clone();
            Box::pin(async move { dispatcher.dispatch(delivery).await })
        })
        .await?;

    tracing::info!("Event consumer started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use articles_core::domain::{Article, ArticleEvent, NewArticle};
    use articles_core::ports::EventPublisher;
    use articles_infra::{InMemoryCache, InMemoryEventBus, InMemoryProjection};

    #[tokio::test]
    async fn bound_events_reach_the_projection() {
        let bus = InMemoryEventBus::new();
        let projection = Arc::new(InMemoryProjection::new());
        let cache = ArticleCache::new(Arc::new(InMemoryCache::new()));
        start(&bus, projection.clone(), cache).await.unwrap();

        let new = NewArticle::new("a".into(), "t".into(), "b".into()).unwrap();
        let article = Article {
            uuid: new.uuid,
            author: new.author,
            title: new.title,
            body: new.body,
            created_at: new.created_at,
            updated_at: new.updated_at,
        };
        let event = ArticleEvent::new(EventKind::Created, article.clone());
        bus.publish(EventKind::Created.routing_key(), &event.payload().unwrap())
            .await
            .unwrap();

        for _ in 0..200 {
            if projection.find_by_uuid(article.uuid).await.unwrap().is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("created event never reached the projection");
    }
}
