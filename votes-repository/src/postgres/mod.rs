//! PostgreSQL implementations of the votes repository.
//!
//! Provides a PostgreSQL backend for the `VoteLedger` and `TargetRepository`
//! traits on top of a shared `sqlx::PgPool`.
//!
//! ## Key Features
//!
//! - Uniqueness of (voter_id, target_kind, target_id) enforced by a table constraint
//! - Atomic find-and-remove with `DELETE ... RETURNING`
//! - Relative counter increments with `UPDATE ... SET n = n + $delta RETURNING`
//!
//! ## Database Tables
//!
//! - `votes`: Individual live votes
//! - `users`, `articles`, `claims`, `reviews`: Counter columns of the votable entities
mod ledger;
mod targets;

pub use ledger::PostgresVoteLedger;
pub use targets::PostgresTargetRepository;

/// Embedded schema migrations for the tables above.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("src/postgres/migrations");
