//! # Articles Core
//!
//! The domain layer of the articles CQRS system.
//! This crate holds the article model, the events that couple the command
//! and query sides, the ports infrastructure must implement, and the
//! application services built on top of them. It has zero infrastructure
//! dependencies.

pub mod application;
pub mod cache;
pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
