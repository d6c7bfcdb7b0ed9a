use thiserror::Error;
use votes_shared::types::TargetKind;

/// Represents errors that can occur within a target repository.
///
/// This enum consolidates error conditions of the stores that own the votable
/// entities and their counters.
#[derive(Debug, Error)]
pub enum TargetRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("No repository registered for target kind {0}")]
    UnregisteredKind(TargetKind),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl TargetRepositoryError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
