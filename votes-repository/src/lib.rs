//! # Votes Repository
//! This crate provides traits and implementations for the vote ledger and for
//! the votable target stores. It includes definitions for errors, interfaces,
//! concrete implementations for PostgreSQL and in-memory stores used by tests
//! and local runs.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::{LedgerError, TargetRepositoryError};
pub use interfaces::{TargetRegistry, TargetRepository, VoteLedger};
pub use memory::{InMemoryTargetRepository, InMemoryVoteLedger};
pub use postgres::{PostgresTargetRepository, PostgresVoteLedger};
