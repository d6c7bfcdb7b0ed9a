//! Configuration and dependency wiring for the votes API.
mod app;
mod cors;
mod dependencies;

pub use app::{AppConfig, StorageBackend};
pub use cors::create_cors_layer;
pub use dependencies::Dependencies;
