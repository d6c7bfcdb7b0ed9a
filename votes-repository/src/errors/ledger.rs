//! Error types for the vote ledger.
//! Defines specific errors that can occur while storing or reading vote rows.
use thiserror::Error;
use votes_shared::types::TargetRef;

/// Represents errors that can occur within the vote ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A live vote already exists for this voter and target.
    #[error("Duplicate vote on {0}")]
    DuplicateVote(TargetRef),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid target kind: {0}")]
    InvalidTargetKind(i16),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateVote(_))
    }
}
