use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;
use votes_shared::types::{TargetRef, Vote, VoteKey, VoteTally};

use crate::{LedgerError, VoteLedger};

/// Vote ledger backed by a map keyed on the (voter, target) slot.
#[derive(Default)]
pub struct InMemoryVoteLedger {
    votes: Mutex<HashMap<VoteKey, Vote>>,
}

impl InMemoryVoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<VoteKey, Vote>>, LedgerError> {
        self.votes
            .lock()
            .map_err(|_| LedgerError::unavailable("vote ledger lock poisoned"))
    }

    /// Number of live rows held for `voter_id` on `target`; never more than one.
    pub fn count_for(&self, voter_id: Uuid, target: TargetRef) -> usize {
        self.lock()
            .map(|votes| {
                votes
                    .values()
                    .filter(|v| v.voter_id == voter_id && v.target == target)
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|votes| votes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VoteLedger for InMemoryVoteLedger {
    async fn find_vote(
        &self,
        voter_id: Uuid,
        target: TargetRef,
    ) -> Result<Option<Vote>, LedgerError> {
        Ok(self.lock()?.get(&VoteKey::new(voter_id, target)).cloned())
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<Vote, LedgerError> {
        let mut votes = self.lock()?;
        let key = vote.key();
        if votes.contains_key(&key) {
            return Err(LedgerError::DuplicateVote(vote.target));
        }
        votes.insert(key, vote.clone());
        Ok(vote.clone())
    }

    async fn delete_vote(
        &self,
        voter_id: Uuid,
        target: TargetRef,
    ) -> Result<Option<Vote>, LedgerError> {
        Ok(self.lock()?.remove(&VoteKey::new(voter_id, target)))
    }

    async fn delete_vote_by_id(&self, id: Uuid) -> Result<Option<Vote>, LedgerError> {
        let mut votes = self.lock()?;
        let key = votes.iter().find(|(_, v)| v.id == id).map(|(key, _)| *key);
        Ok(key.and_then(|key| votes.remove(&key)))
    }

    async fn tally(&self, target: TargetRef) -> Result<VoteTally, LedgerError> {
        let votes = self.lock()?;
        let mut tally = VoteTally::default();
        for vote in votes.values().filter(|v| v.target == target) {
            tally.record(vote.rating);
        }
        Ok(tally)
    }
}
