mod counters;
mod rating;
mod target;
mod views;
mod vote;

pub use counters::{CounterDelta, VoteCounters, VoteTally};
pub use rating::{Rating, RatingScale, UnknownRatingScale, VoteSign};
pub use target::{TargetKind, TargetRef, TargetSelector, TargetSelectorError};
pub use views::{CounterAudit, TargetView, VoteView, VotedTargetView};
pub use vote::{Vote, VoteKey};
