//! In-memory implementations of the repository traits.
//!
//! Used by the `memory` storage backend and by tests. Each operation holds a
//! single lock for its whole duration, which gives the same atomicity the
//! PostgreSQL implementations get from single statements.
mod ledger;
mod targets;

pub use ledger::InMemoryVoteLedger;
pub use targets::InMemoryTargetRepository;
