//! Domain entities - the core business objects.

mod article;
mod event;

pub use article::{Article, ArticleChanges, NewArticle, parse_uuid};
pub use event::{ArticleEvent, EXCHANGE, EventKind, UnknownRoutingKey};
