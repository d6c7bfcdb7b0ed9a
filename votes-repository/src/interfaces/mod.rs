//! This module defines and re-exports the interfaces for the votes repository.
//! It serves as a central point for accessing traits related to data interaction.
mod ledger;
mod targets;

pub use ledger::VoteLedger;
pub use targets::{TargetRegistry, TargetRepository};
