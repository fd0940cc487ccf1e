//! # Articles Web
//!
//! HTTP plumbing shared by the command service, the query service and the
//! gateway: the error envelope, request ids, CORS, request deadlines and
//! telemetry setup.

pub mod cors;
pub mod deadline;
pub mod error;
pub mod request_id;
pub mod response;
pub mod telemetry;

pub use cors::cors;
pub use deadline::with_deadline;
pub use error::{AppError, AppResult, extractor_config};
pub use request_id::{RequestId, RequestIdMiddleware};
pub use telemetry::{TelemetryConfig, init_telemetry};
