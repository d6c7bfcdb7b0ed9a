//! Error types returned by the rating service.
use thiserror::Error;
use votes_repository::{LedgerError, TargetRepositoryError};
use votes_shared::types::{Rating, TargetKind, TargetRef, TargetSelectorError};

/// Errors surfaced by [`crate::RatingService`] operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoteError {
    /// The selector did not name exactly one well-formed target.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Rating {rating} is not valid for a {kind}")]
    InvalidRating { kind: TargetKind, rating: Rating },

    #[error("Vote text must be at most {max} characters")]
    InvalidText { max: usize },

    #[error("Target not found: {0}")]
    TargetNotFound(TargetRef),

    #[error("No vote to retract on {0}")]
    VoteNotFound(TargetRef),

    /// Another request claimed the (voter, target) slot first and retries ran out.
    #[error("Concurrent vote on {0}")]
    DuplicateVote(TargetRef),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl VoteError {
    pub fn invalid_target(msg: impl Into<String>) -> Self {
        Self::InvalidTarget(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Whether repeating the whole cast may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DuplicateVote(_))
    }

    /// Caller mistakes, as opposed to missing data or storage trouble.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTarget(_) | Self::InvalidRating { .. } | Self::InvalidText { .. }
        )
    }
}

impl From<TargetSelectorError> for VoteError {
    fn from(err: TargetSelectorError) -> Self {
        Self::InvalidTarget(err.to_string())
    }
}

impl From<LedgerError> for VoteError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DuplicateVote(target) => Self::DuplicateVote(target),
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}

impl From<TargetRepositoryError> for VoteError {
    fn from(err: TargetRepositoryError) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}
