//! Command executor: mutate the authoritative store, refresh the cache,
//! publish the event.
//!
//! Each mutation runs in its own task, so dropping the caller (request
//! deadline, client disconnect) never cuts a committed change off from its
//! event. Mutations of one uuid are serialised from commit to publish, which
//! keeps events in commit order.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cache::ArticleCache;
use crate::domain::{Article, ArticleChanges, ArticleEvent, EventKind, NewArticle};
use crate::error::{DomainError, RepoError};
use crate::ports::{ArticleStore, EventPublisher};

#[derive(Clone)]
pub struct ArticleCommandService {
    inner: Arc<Executor>,
}

struct Executor {
    store: Arc<dyn ArticleStore>,
    publisher: Arc<dyn EventPublisher>,
    cache: ArticleCache,
    locks: UuidLocks,
}

impl ArticleCommandService {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        publisher: Arc<dyn EventPublisher>,
        cache: ArticleCache,
    ) -> Self {
        Self {
            inner: Arc::new(Executor {
                store,
                publisher,
                cache,
                locks: UuidLocks::default(),
            }),
        }
    }

    /// Create an article with a fresh uuid.
    pub async fn store(
        &self,
        author: String,
        title: String,
        body: String,
    ) -> Result<Article, DomainError> {
        let new_article = NewArticle::new(author, title, body)?;
        let inner = self.inner.clone();
        detached(async move { inner.store(new_article).await }).await
    }

    /// Replace the content of an existing article.
    pub async fn update(
        &self,
        uuid: Uuid,
        author: String,
        title: String,
        body: String,
    ) -> Result<Article, DomainError> {
        let inner = self.inner.clone();
        detached(async move { inner.update(uuid, author, title, body).await }).await
    }

    /// Delete an article, returning it as it was before removal.
    pub async fn delete(&self, uuid: Uuid) -> Result<Article, DomainError> {
        let inner = self.inner.clone();
        detached(async move { inner.delete(uuid).await }).await
    }
}

/// Run `work` on its own task and wait for it. The task outlives the caller.
async fn detached<F>(work: F) -> Result<Article, DomainError>
where
    F: Future<Output = Result<Article, DomainError>> + Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| DomainError::Internal(format!("command task failed: {e}")))?
}

impl Executor {
    async fn store(&self, new_article: NewArticle) -> Result<Article, DomainError> {
        let uuid = new_article.uuid;
        let lock = self.locks.get(uuid).await;
        let _guard = lock.lock().await;

        let article = self
            .store
            .insert(new_article)
            .await
            .map_err(|e| storage_error(e, uuid))?;
        tracing::info!(uuid = %article.uuid, "Article created");

        self.committed(EventKind::Created, article).await
    }

    async fn update(
        &self,
        uuid: Uuid,
        author: String,
        title: String,
        body: String,
    ) -> Result<Article, DomainError> {
        let lock = self.locks.get(uuid).await;
        let _guard = lock.lock().await;

        // Stamped under the lock so the last committer carries the latest time.
        let changes = ArticleChanges::new(author, title, body)?;
        let article = self
            .store
            .update(uuid, changes)
            .await
            .map_err(|e| storage_error(e, uuid))?;
        tracing::info!(uuid = %uuid, "Article updated");

        self.committed(EventKind::Updated, article).await
    }

    async fn delete(&self, uuid: Uuid) -> Result<Article, DomainError> {
        let lock = self.locks.get(uuid).await;
        let _guard = lock.lock().await;

        let article = self
            .store
            .delete(uuid)
            .await
            .map_err(|e| storage_error(e, uuid))?;
        tracing::info!(uuid = %uuid, "Article deleted");

        self.committed(EventKind::Deleted, article).await
    }

    /// Post-commit work: cache first, then exactly one event.
    ///
    /// A publication failure here leaves the write in place; the caller sees
    /// an error and the projection lags until the article is written again.
    async fn committed(&self, kind: EventKind, article: Article) -> Result<Article, DomainError> {
        match kind {
            EventKind::Created | EventKind::Updated => self.cache.put_article(&article).await,
            EventKind::Deleted => self.cache.evict_article(&article.uuid).await,
        }

        let event = ArticleEvent::new(kind, article);
        let payload = event
            .payload()
            .map_err(|e| DomainError::Internal(format!("failed to encode event: {e}")))?;

        if let Err(e) = self.publisher.publish(kind.routing_key(), &payload).await {
            tracing::error!(
                uuid = %event.article.uuid,
                routing_key = %kind,
                error = %e,
                "Event publication failed after commit; projection will lag"
            );
            return Err(e.into());
        }
        tracing::debug!(uuid = %event.article.uuid, routing_key = %kind, "Event published");

        Ok(event.article)
    }
}

/// One async mutex per uuid with a mutation in flight. Entries are dropped
/// once no caller holds them.
#[derive(Default)]
struct UuidLocks {
    locks: Mutex<HashMap<Uuid, Weak<Mutex<()>>>>,
}

impl UuidLocks {
    async fn get(&self, uuid: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        if let Some(lock) = locks.get(&uuid).and_then(Weak::upgrade) {
            return lock;
        }
        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(Mutex::new(()));
        locks.insert(uuid, Arc::downgrade(&lock));
        lock
    }
}

fn storage_error(err: RepoError, uuid: Uuid) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::article_not_found(uuid),
        other => DomainError::Storage(other),
    }
}
