//! Domain events - one per committed mutation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Article;

/// Exchange every article event is published to.
pub const EXCHANGE: &str = "articles";

/// The kind of change an event describes. Doubles as the bus routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Created, EventKind::Updated, EventKind::Deleted];

    pub fn routing_key(self) -> &'static str {
        match self {
            EventKind::Created => "article.created",
            EventKind::Updated => "article.updated",
            EventKind::Deleted => "article.deleted",
        }
    }

    /// Routing keys the projection binds to.
    pub fn routing_keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.routing_key()).collect()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.routing_key())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown routing key: {0}")]
pub struct UnknownRoutingKey(pub String);

impl FromStr for EventKind {
    type Err = UnknownRoutingKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.routing_key() == s)
            .ok_or_else(|| UnknownRoutingKey(s.to_string()))
    }
}

/// An article state change as it travels over the bus.
///
/// The payload is the full post-transition article; for deletes it is the
/// article as it existed immediately before removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleEvent {
    pub kind: EventKind,
    pub article: Article,
}

impl ArticleEvent {
    pub fn new(kind: EventKind, article: Article) -> Self {
        Self { kind, article }
    }

    /// Serialize the payload as UTF-8 JSON.
    pub fn payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.article)
    }

    /// Rebuild an event from a routing key and a JSON payload.
    pub fn decode(kind: EventKind, payload: &[u8]) -> Result<Self, serde_json::Error> {
        let article = serde_json::from_slice(payload)?;
        Ok(Self { kind, article })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_keys_parse_back() {
        for kind in EventKind::ALL {
            assert_eq!(kind.routing_key().parse::<EventKind>().unwrap(), kind);
        }
        assert!("article.archived".parse::<EventKind>().is_err());
    }

    #[test]
    fn decode_rejects_malformed_payload() {
        assert!(ArticleEvent::decode(EventKind::Created, b"{not json").is_err());
        assert!(ArticleEvent::decode(EventKind::Created, br#"{"uuid":"x"}"#).is_err());
    }

    #[test]
    fn payload_carries_no_internal_id() {
        let now = chrono::Utc::now();
        let event = ArticleEvent::new(
            EventKind::Created,
            Article {
                uuid: uuid::Uuid::new_v4(),
                author: "a".into(),
                title: "t".into(),
                body: "b".into(),
                created_at: now,
                updated_at: now,
            },
        );
        let value: serde_json::Value = serde_json::from_slice(&event.payload().unwrap()).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            ["author", "body", "created_at", "title", "updated_at", "uuid"]
        );
    }
}
