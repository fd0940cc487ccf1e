//! Application services - the command executor, the projection applier and
//! the query reader, each written against the ports only.

mod command;
mod projection;
mod query;

pub use command::ArticleCommandService;
pub use projection::{APPLY_TIMEOUT, EventDispatcher, ProjectionApplier};
pub use query::ArticleQueryService;
