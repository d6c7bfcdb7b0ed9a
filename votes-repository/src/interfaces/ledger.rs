//! This module defines the `VoteLedger` trait, the authoritative store of
//! individual votes. Implementations own the "one live vote per
//! (voter, target)" invariant at the storage layer.
use crate::errors::LedgerError;
use uuid::Uuid;
use votes_shared::types::{TargetRef, Vote, VoteTally};

/// A trait that defines the interface for interacting with the vote ledger.
///
/// Every method is a suspension point where concurrent requests may interleave,
/// so implementations must make `insert_vote` and `delete_vote` atomic on their own.
#[async_trait::async_trait]
pub trait VoteLedger: Send + Sync {
    /// Looks up the live vote of `voter_id` on `target`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Vote))` - The live vote
    /// * `Ok(None)` - The voter has not voted on this target
    /// * `Err(LedgerError)` - Storage failure
    async fn find_vote(
        &self,
        voter_id: Uuid,
        target: TargetRef,
    ) -> Result<Option<Vote>, LedgerError>;

    /// Inserts a new vote row.
    ///
    /// # Returns
    ///
    /// * `Ok(Vote)` - The persisted row
    /// * `Err(LedgerError::DuplicateVote)` - A live vote already occupies the (voter, target) slot
    /// * `Err(LedgerError)` - Storage failure
    async fn insert_vote(&self, vote: &Vote) -> Result<Vote, LedgerError>;

    /// Atomically finds and removes the live vote of `voter_id` on `target`.
    ///
    /// Two concurrent callers can never both receive the same removed row.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Vote))` - The removed row
    /// * `Ok(None)` - There was nothing to remove
    /// * `Err(LedgerError)` - Storage failure
    async fn delete_vote(
        &self,
        voter_id: Uuid,
        target: TargetRef,
    ) -> Result<Option<Vote>, LedgerError>;

    /// Removes the vote row with the given `id`, whichever slot it occupies.
    ///
    /// Leaves a newer vote in the same (voter, target) slot untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Vote))` - The removed row
    /// * `Ok(None)` - No row with this id is live
    /// * `Err(LedgerError)` - Storage failure
    async fn delete_vote_by_id(&self, id: Uuid) -> Result<Option<Vote>, LedgerError>;

    /// Counts the live votes on `target` by sign.
    async fn tally(&self, target: TargetRef) -> Result<VoteTally, LedgerError>;
}
