//! Projections returned to callers.
//!
//! Field names follow the platform's JSON conventions (`addedBy`, `nBeenVoted`,
//! `userVote`) so existing clients keep working.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Rating, TargetKind, TargetRef, Vote, VoteCounters, VoteTally};

/// Whitelisted projection of a ledger row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteView {
    pub id: Uuid,
    pub added_by: Uuid,
    pub target_kind: TargetKind,
    pub target_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub rating: Rating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Vote> for VoteView {
    fn from(vote: &Vote) -> Self {
        let id = Some(vote.target.id);
        let mut view = VoteView {
            id: vote.id,
            added_by: vote.voter_id,
            target_kind: vote.target.kind,
            target_id: vote.target.id,
            article_id: None,
            claim_id: None,
            review_id: None,
            user_id: None,
            rating: vote.rating,
            text: vote.text.clone(),
            created_at: vote.created_at,
        };
        match vote.target.kind {
            TargetKind::Article => view.article_id = id,
            TargetKind::Claim => view.claim_id = id,
            TargetKind::Review => view.review_id = id,
            TargetKind::User => view.user_id = id,
        }
        view
    }
}

/// A target's counters as seen by a particular caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetView {
    pub kind: TargetKind,
    pub id: Uuid,
    #[serde(flatten)]
    pub counters: VoteCounters,
    /// The caller's live rating on this target, if any.
    pub user_vote: Option<Rating>,
}

impl TargetView {
    pub fn new(target: TargetRef, counters: VoteCounters, user_vote: Option<Rating>) -> Self {
        Self {
            kind: target.kind,
            id: target.id,
            counters,
            user_vote,
        }
    }

    pub fn target(&self) -> TargetRef {
        TargetRef::new(self.kind, self.id)
    }
}

/// The result of a successful cast: the persisted vote and the refreshed target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VotedTargetView {
    #[serde(flatten)]
    pub vote: VoteView,
    pub target: TargetView,
}

/// Comparison of a target's stored counters with the ledger's live rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CounterAudit {
    pub kind: TargetKind,
    pub id: Uuid,
    pub stored: VoteCounters,
    pub expected: VoteCounters,
    pub tally: VoteTally,
    pub consistent: bool,
}

impl CounterAudit {
    pub fn new(target: TargetRef, stored: VoteCounters, tally: VoteTally) -> Self {
        let expected = tally.expected_counters(target.kind);
        Self {
            kind: target.kind,
            id: target.id,
            stored,
            expected,
            tally,
            consistent: stored == expected,
        }
    }
}
