//! # Articles Shared
//!
//! Wire types shared by the command service, the query service and the gateway.

pub mod dto;
pub mod response;

pub use response::ApiResponse;
