//! Error types for the votes API.
//! Covers start-up configuration failures and the errors returned to HTTP callers.
mod api;
mod config;

pub use api::ApiError;
pub use config::ConfigError;
