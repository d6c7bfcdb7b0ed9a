//! # Votes API
//! HTTP front of the votes service: configuration from the environment,
//! dependency wiring for the PostgreSQL or in-memory backend, the axum router
//! and the mapping from service errors to HTTP responses.
pub mod config;
pub mod errors;
pub mod server;

pub use config::{AppConfig, Dependencies, StorageBackend};
pub use errors::{ApiError, ConfigError};
