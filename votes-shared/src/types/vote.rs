use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Rating, TargetRef};

/// A single live vote recorded in the ledger.
///
/// A vote is never updated in place; recasting replaces the row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    pub voter_id: Uuid,
    pub target: TargetRef,
    pub rating: Rating,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(voter_id: Uuid, target: TargetRef, rating: Rating, text: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            voter_id,
            target,
            rating,
            text,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> VoteKey {
        VoteKey::new(self.voter_id, self.target)
    }
}

/// The (voter, target) slot that holds at most one live vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoteKey {
    pub voter_id: Uuid,
    pub target: TargetRef,
}

impl VoteKey {
    pub fn new(voter_id: Uuid, target: TargetRef) -> Self {
        Self { voter_id, target }
    }
}
