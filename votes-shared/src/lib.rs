//! # Votes Shared
//! This crate defines the domain types shared across the votes ledger service.
//! It includes vote targets, ratings, ledger rows, aggregate counters and the
//! projections returned to callers.
pub mod types;
