//! Error types for the votes repository.
//! Consolidates and re-exports error types related to ledger and target store operations.
mod ledger;
mod targets;

pub use ledger::LedgerError;
pub use targets::TargetRepositoryError;
