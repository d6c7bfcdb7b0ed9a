//! # Votes Service
//! The rating service sits between callers and the storage layer. It resolves
//! target selectors, validates ratings, keeps exactly one live vote per
//! (voter, target) and mirrors every ledger change onto the target's counters
//! with relative increments.
pub mod config;
pub mod errors;
pub mod service;

pub use config::RatingServiceConfig;
pub use errors::VoteError;
pub use service::RatingService;
