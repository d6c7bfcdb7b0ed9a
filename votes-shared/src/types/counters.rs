use serde::{Deserialize, Serialize};

use crate::types::{Rating, TargetKind, VoteSign};

/// The denormalised vote counters stored on a votable target.
///
/// `n_neutral_votes` is `None` for kinds that carry no neutral counter.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteCounters {
    pub n_been_voted: i64,
    pub n_positive_votes: i64,
    pub n_negative_votes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_neutral_votes: Option<i64>,
}

impl VoteCounters {
    /// Zeroed counters shaped for the given kind.
    pub fn empty(kind: TargetKind) -> Self {
        Self {
            n_neutral_votes: kind.has_neutral_counter().then_some(0),
            ..Self::default()
        }
    }

    /// Returns the counters after adding `delta`.
    pub fn with_delta(mut self, delta: &CounterDelta) -> Self {
        self.n_been_voted += delta.been_voted;
        self.n_positive_votes += delta.positive;
        self.n_negative_votes += delta.negative;
        if let Some(neutral) = self.n_neutral_votes.as_mut() {
            *neutral += delta.neutral;
        }
        self
    }

    /// `nBeenVoted` equals the sum of the partitioned counters.
    pub fn is_balanced(&self) -> bool {
        self.n_been_voted
            == self.n_positive_votes + self.n_negative_votes + self.n_neutral_votes.unwrap_or(0)
    }
}

/// A signed, relative change to a target's counters.
///
/// Deltas are applied with an atomic increment on the target store and are
/// never turned into absolute values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub been_voted: i64,
    pub positive: i64,
    pub negative: i64,
    pub neutral: i64,
}

impl CounterDelta {
    fn for_rating(rating: Rating, step: i64) -> Self {
        let Some(sign) = rating.sign() else {
            return Self::default();
        };

        let mut delta = Self {
            been_voted: step,
            ..Self::default()
        };
        match sign {
            VoteSign::Positive => delta.positive = step,
            VoteSign::Negative => delta.negative = step,
            VoteSign::Neutral => delta.neutral = step,
        }
        delta
    }

    /// The contribution a newly recorded vote makes.
    pub fn apply(rating: Rating) -> Self {
        Self::for_rating(rating, 1)
    }

    /// The exact reversal of [`CounterDelta::apply`] for a removed vote.
    pub fn retract(rating: Rating) -> Self {
        Self::for_rating(rating, -1)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Counters derived from the live rows in the ledger.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub positive: i64,
    pub negative: i64,
    pub neutral: i64,
    /// Rows that do not contribute to counters (`no_info`).
    pub uncounted: i64,
}

impl VoteTally {
    pub fn record(&mut self, rating: Rating) {
        match rating.sign() {
            Some(VoteSign::Positive) => self.positive += 1,
            Some(VoteSign::Negative) => self.negative += 1,
            Some(VoteSign::Neutral) => self.neutral += 1,
            None => self.uncounted += 1,
        }
    }

    /// The counters a target of `kind` should carry for this tally.
    pub fn expected_counters(&self, kind: TargetKind) -> VoteCounters {
        VoteCounters {
            n_been_voted: self.positive + self.negative + self.neutral,
            n_positive_votes: self.positive,
            n_negative_votes: self.negative,
            n_neutral_votes: kind.has_neutral_counter().then_some(self.neutral),
        }
    }
}
