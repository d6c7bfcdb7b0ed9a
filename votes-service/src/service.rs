//! Rating service implementation.
//!
//! This module provides the use cases callers run against the vote ledger:
//! casting, retracting, reading a target with the caller's own vote, and
//! auditing a target's counters against the ledger.
//!
//! # Counter maintenance
//!
//! Counters are never recomputed. Every ledger change is mirrored onto the
//! target with a [`CounterDelta`] applied as an atomic relative increment, so
//! concurrent votes from different voters commute.

use std::sync::Arc;

use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use votes_repository::{TargetRegistry, TargetRepository, VoteLedger};
use votes_shared::types::{
    CounterAudit, CounterDelta, Rating, TargetRef, TargetSelector, TargetView, Vote, VoteCounters,
    VoteView, VotedTargetView,
};

use crate::config::RatingServiceConfig;
use crate::errors::VoteError;

/// The main service for recording votes.
///
/// Holds the ledger and one target repository per [`votes_shared::types::TargetKind`].
/// Both are injected, so tests can run the service against in-memory stores or fakes.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use votes_repository::{InMemoryTargetRepository, InMemoryVoteLedger, TargetRegistry};
/// use votes_service::RatingService;
/// use votes_shared::types::{Rating, TargetKind, TargetRef, TargetSelector};
///
/// # async fn example() -> Result<(), votes_service::VoteError> {
/// let claim = uuid::Uuid::new_v4();
/// let claims = InMemoryTargetRepository::new(TargetKind::Claim).with_targets([claim]);
/// let registry = TargetRegistry::new().with(Arc::new(claims));
/// let service = RatingService::new(Arc::new(InMemoryVoteLedger::new()), registry);
///
/// let selector = TargetSelector::from(TargetRef::claim(claim));
/// let voted = service
///     .cast_vote(uuid::Uuid::new_v4(), &selector, Rating::POSITIVE, None)
///     .await?;
/// assert_eq!(voted.target.counters.n_positive_votes, 1);
/// # Ok(())
/// # }
/// ```
pub struct RatingService {
    ledger: Arc<dyn VoteLedger>,
    targets: TargetRegistry,
    config: RatingServiceConfig,
}

impl RatingService {
    /// Create a new RatingService with default configuration.
    ///
    /// # Arguments
    ///
    /// * `ledger` - The store of individual votes
    /// * `targets` - Repositories for every kind of entity that may be voted on
    pub fn new(ledger: Arc<dyn VoteLedger>, targets: TargetRegistry) -> Self {
        Self::with_config(ledger, targets, RatingServiceConfig::default())
    }

    /// Create a new RatingService with custom configuration.
    pub fn with_config(
        ledger: Arc<dyn VoteLedger>,
        targets: TargetRegistry,
        config: RatingServiceConfig,
    ) -> Self {
        Self {
            ledger,
            targets,
            config,
        }
    }

    pub fn config(&self) -> &RatingServiceConfig {
        &self.config
    }

    fn validate_rating(&self, target: TargetRef, rating: Rating) -> Result<(), VoteError> {
        if rating.is_valid_for(target.kind, self.config.scale) {
            Ok(())
        } else {
            Err(VoteError::InvalidRating {
                kind: target.kind,
                rating,
            })
        }
    }

    fn validate_text(&self, text: Option<&str>) -> Result<(), VoteError> {
        match text {
            Some(text) if text.chars().count() > self.config.max_text_len => {
                Err(VoteError::InvalidText {
                    max: self.config.max_text_len,
                })
            }
            _ => Ok(()),
        }
    }

    /// Applies `delta` to the target and returns the counters afterwards.
    ///
    /// A zero delta only reads the counters.
    async fn adjust(
        repository: &dyn TargetRepository,
        target: TargetRef,
        delta: CounterDelta,
    ) -> Result<VoteCounters, VoteError> {
        let counters = if delta.is_zero() {
            repository.get_counters(target.id).await?
        } else {
            repository.increment_counters(target.id, &delta).await?
        };
        counters.ok_or(VoteError::TargetNotFound(target))
    }

    /// Record `voter_id`'s rating of the selected target, replacing any earlier vote.
    ///
    /// The sequence is: resolve and validate, check the target exists, remove
    /// the voter's previous vote and reverse its counters, insert the new vote,
    /// apply its counters. Recasting the same rating still replaces the row.
    ///
    /// # Arguments
    ///
    /// * `voter_id` - The authenticated caller
    /// * `selector` - Exactly one of `articleId`, `claimId`, `reviewId`, `userId`
    /// * `rating` - The value to record
    /// * `text` - Optional comment
    ///
    /// # Returns
    ///
    /// * `Ok(VotedTargetView)` - The new vote and the target's counters after it
    /// * `Err(VoteError::InvalidTarget)` - The selector names zero or several targets, or a malformed id
    /// * `Err(VoteError::InvalidRating)` / `Err(VoteError::InvalidText)` - Rejected before any mutation
    /// * `Err(VoteError::TargetNotFound)` - The target does not exist
    /// * `Err(VoteError::DuplicateVote)` - A concurrent cast kept winning after all retries
    /// * `Err(VoteError::StorageUnavailable)` - A store failed
    #[instrument(skip_all, fields(voter_id = %voter_id))]
    pub async fn cast_vote(
        &self,
        voter_id: Uuid,
        selector: &TargetSelector,
        rating: Rating,
        text: Option<String>,
    ) -> Result<VotedTargetView, VoteError> {
        let target = selector.resolve()?;
        self.validate_rating(target, rating)?;
        self.validate_text(text.as_deref())?;
        let repository = self.targets.get(target.kind)?.clone();

        let strategy =
            FixedInterval::new(self.config.retry_delay).take(self.config.duplicate_retries);
        let result = RetryIf::spawn(
            strategy,
            || self.cast_once(repository.as_ref(), voter_id, target, rating, text.clone()),
            |err: &VoteError| {
                if err.is_transient() {
                    debug!(%target, "Lost a concurrent vote on the same slot, retrying");
                }
                err.is_transient()
            },
        )
        .await;

        if let Err(VoteError::DuplicateVote(_)) = &result {
            warn!(
                %voter_id,
                %target,
                retries = self.config.duplicate_retries,
                "Concurrent votes kept conflicting, giving up"
            );
        }
        result
    }

    async fn cast_once(
        &self,
        repository: &dyn TargetRepository,
        voter_id: Uuid,
        target: TargetRef,
        rating: Rating,
        text: Option<String>,
    ) -> Result<VotedTargetView, VoteError> {
        if !repository.exists(target.id).await? {
            return Err(VoteError::TargetNotFound(target));
        }

        let replaced = self.ledger.delete_vote(voter_id, target).await?;
        if let Some(previous) = &replaced {
            debug!(%target, previous_rating = %previous.rating, "Replacing previous vote");
            if let Err(err) =
                Self::adjust(repository, target, CounterDelta::retract(previous.rating)).await
            {
                self.restore_vote(previous).await;
                return Err(err);
            }
        }

        let vote = Vote::new(voter_id, target, rating, text);
        let vote = self.ledger.insert_vote(&vote).await.map_err(|err| {
            let err = VoteError::from(err);
            if replaced.is_some() && !err.is_transient() {
                warn!(
                    %voter_id,
                    %target,
                    error = %err,
                    "Previous vote was removed but the new vote was not recorded"
                );
            }
            err
        })?;

        let counters = match Self::adjust(repository, target, CounterDelta::apply(rating)).await {
            Ok(counters) => counters,
            Err(err) => {
                self.discard_vote(repository, &vote).await;
                return Err(err);
            }
        };

        info!(
            %target,
            rating = %vote.rating,
            replaced = replaced.is_some(),
            "Vote cast"
        );
        Ok(VotedTargetView {
            vote: VoteView::from(&vote),
            target: TargetView::new(target, counters, Some(vote.rating)),
        })
    }

    /// Puts back a vote whose counter reversal failed.
    async fn restore_vote(&self, previous: &Vote) {
        match self.ledger.insert_vote(previous).await {
            Ok(_) => debug!(target = %previous.target, "Restored previous vote"),
            Err(err) => warn!(
                voter_id = %previous.voter_id,
                target = %previous.target,
                error = %err,
                "Vote was removed but neither its counters were reversed nor the row restored"
            ),
        }
    }

    /// Removes a freshly inserted vote whose counters could not be applied.
    ///
    /// Deletes by row id. If a concurrent request already took the row, that
    /// request reverses its counters, so the unapplied delta is owed and is
    /// applied here instead.
    async fn discard_vote(&self, repository: &dyn TargetRepository, vote: &Vote) {
        match self.ledger.delete_vote_by_id(vote.id).await {
            Ok(Some(_)) => debug!(target = %vote.target, "Discarded vote without counters"),
            Ok(None) => {
                debug!(
                    target = %vote.target,
                    "Vote was taken over concurrently, settling its counters"
                );
                if let Err(err) =
                    Self::adjust(repository, vote.target, CounterDelta::apply(vote.rating)).await
                {
                    warn!(
                        voter_id = %vote.voter_id,
                        target = %vote.target,
                        error = %err,
                        "Replaced vote was reversed but its counters were never applied"
                    );
                }
            }
            Err(err) => warn!(
                voter_id = %vote.voter_id,
                target = %vote.target,
                error = %err,
                "Vote was recorded but its counters were not applied"
            ),
        }
    }

    /// Remove `voter_id`'s live vote on the selected target and reverse its counters.
    ///
    /// # Returns
    ///
    /// * `Ok(TargetView)` - The target's counters after the removal
    /// * `Err(VoteError::VoteNotFound)` - The caller had no vote on this target
    #[instrument(skip_all, fields(voter_id = %voter_id))]
    pub async fn retract_vote(
        &self,
        voter_id: Uuid,
        selector: &TargetSelector,
    ) -> Result<TargetView, VoteError> {
        let target = selector.resolve()?;
        let repository = self.targets.get(target.kind)?;
        if !repository.exists(target.id).await? {
            return Err(VoteError::TargetNotFound(target));
        }

        let removed = self
            .ledger
            .delete_vote(voter_id, target)
            .await?
            .ok_or(VoteError::VoteNotFound(target))?;

        let counters =
            match Self::adjust(repository.as_ref(), target, CounterDelta::retract(removed.rating))
                .await
            {
                Ok(counters) => counters,
                Err(err) => {
                    self.restore_vote(&removed).await;
                    return Err(err);
                }
            };

        info!(%target, rating = %removed.rating, "Vote retracted");
        Ok(TargetView::new(target, counters, None))
    }

    /// The target's counters together with the caller's live rating, if any.
    #[instrument(skip_all, fields(voter_id = %voter_id))]
    pub async fn target_view(
        &self,
        voter_id: Uuid,
        selector: &TargetSelector,
    ) -> Result<TargetView, VoteError> {
        let target = selector.resolve()?;
        let counters = self
            .targets
            .get(target.kind)?
            .get_counters(target.id)
            .await?
            .ok_or(VoteError::TargetNotFound(target))?;
        let user_vote = self
            .ledger
            .find_vote(voter_id, target)
            .await?
            .map(|vote| vote.rating);

        Ok(TargetView::new(target, counters, user_vote))
    }

    /// Compares the target's stored counters with the live rows in the ledger.
    ///
    /// Reports drift but never repairs it.
    #[instrument(skip_all)]
    pub async fn audit_target(&self, selector: &TargetSelector) -> Result<CounterAudit, VoteError> {
        let target = selector.resolve()?;
        let stored = self
            .targets
            .get(target.kind)?
            .get_counters(target.id)
            .await?
            .ok_or(VoteError::TargetNotFound(target))?;
        let tally = self.ledger.tally(target).await?;

        let audit = CounterAudit::new(target, stored, tally);
        if !audit.consistent {
            warn!(
                %target,
                stored = ?audit.stored,
                expected = ?audit.expected,
                "Target counters disagree with the vote ledger"
            );
        }
        Ok(audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votes_repository::{InMemoryTargetRepository, InMemoryVoteLedger};
    use votes_shared::types::TargetKind;

    struct Fixture {
        service: RatingService,
        ledger: Arc<InMemoryVoteLedger>,
        articles: Arc<InMemoryTargetRepository>,
        reviews: Arc<InMemoryTargetRepository>,
        article: Uuid,
        review: Uuid,
    }

    fn fixture() -> Fixture {
        let article = Uuid::new_v4();
        let review = Uuid::new_v4();
        let ledger = Arc::new(InMemoryVoteLedger::new());
        let articles =
            Arc::new(InMemoryTargetRepository::new(TargetKind::Article).with_targets([article]));
        let reviews =
            Arc::new(InMemoryTargetRepository::new(TargetKind::Review).with_targets([review]));
        let registry = TargetRegistry::new()
            .with(articles.clone())
            .with(reviews.clone());

        Fixture {
            service: RatingService::new(ledger.clone(), registry),
            ledger,
            articles,
            reviews,
            article,
            review,
        }
    }

    #[tokio::test]
    async fn test_neutral_rating_rejected_for_article() {
        let f = fixture();
        let selector = TargetSelector::from(TargetRef::article(f.article));

        let err = f
            .service
            .cast_vote(Uuid::new_v4(), &selector, Rating::NEUTRAL, None)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            VoteError::InvalidRating {
                kind: TargetKind::Article,
                rating: Rating::NEUTRAL
            }
        );
        assert!(f.ledger.is_empty());
        assert_eq!(
            f.articles.counters(f.article),
            Some(VoteCounters::empty(TargetKind::Article))
        );
    }

    #[tokio::test]
    async fn test_text_longer_than_limit_rejected() {
        let f = fixture();
        let selector = TargetSelector::from(TargetRef::article(f.article));
        let text = "x".repeat(129);

        let err = f
            .service
            .cast_vote(Uuid::new_v4(), &selector, Rating::POSITIVE, Some(text))
            .await
            .unwrap_err();

        assert_eq!(err, VoteError::InvalidText { max: 128 });
        assert!(f.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_text_at_limit_accepted() {
        let f = fixture();
        let selector = TargetSelector::from(TargetRef::article(f.article));
        let text = "é".repeat(128);

        let voted = f
            .service
            .cast_vote(Uuid::new_v4(), &selector, Rating::POSITIVE, Some(text.clone()))
            .await
            .unwrap();
        assert_eq!(voted.vote.text, Some(text));
    }

    #[tokio::test]
    async fn test_no_info_only_touches_ledger() {
        let f = fixture();
        let voter = Uuid::new_v4();
        let selector = TargetSelector::from(TargetRef::review(f.review));

        let voted = f
            .service
            .cast_vote(voter, &selector, Rating::NoInfo, None)
            .await
            .unwrap();

        assert_eq!(voted.target.counters, VoteCounters::empty(TargetKind::Review));
        assert_eq!(voted.target.user_vote, Some(Rating::NoInfo));
        assert_eq!(f.ledger.len(), 1);
        assert_eq!(
            f.reviews.counters(f.review),
            Some(VoteCounters::empty(TargetKind::Review))
        );
    }

    #[tokio::test]
    async fn test_unregistered_kind_is_storage_error() {
        let f = fixture();
        let selector = TargetSelector::from(TargetRef::user(Uuid::new_v4()));

        let err = f
            .service
            .cast_vote(Uuid::new_v4(), &selector, Rating::POSITIVE, None)
            .await
            .unwrap_err();
        assert!(matches!(err, VoteError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn test_retract_without_vote() {
        let f = fixture();
        let target = TargetRef::article(f.article);

        let err = f
            .service
            .retract_vote(Uuid::new_v4(), &TargetSelector::from(target))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::VoteNotFound(target));
    }

    #[tokio::test]
    async fn test_retract_reverses_counters() {
        let f = fixture();
        let voter = Uuid::new_v4();
        let selector = TargetSelector::from(TargetRef::article(f.article));

        f.service
            .cast_vote(voter, &selector, Rating::NEGATIVE, None)
            .await
            .unwrap();
        let view = f.service.retract_vote(voter, &selector).await.unwrap();

        assert_eq!(view.counters, VoteCounters::empty(TargetKind::Article));
        assert_eq!(view.user_vote, None);
        assert!(f.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_target_view_reports_user_vote() {
        let f = fixture();
        let voter = Uuid::new_v4();
        let selector = TargetSelector::from(TargetRef::article(f.article));

        f.service
            .cast_vote(voter, &selector, Rating::POSITIVE, None)
            .await
            .unwrap();

        let own = f.service.target_view(voter, &selector).await.unwrap();
        assert_eq!(own.user_vote, Some(Rating::POSITIVE));
        assert_eq!(own.counters.n_positive_votes, 1);

        let other = f.service.target_view(Uuid::new_v4(), &selector).await.unwrap();
        assert_eq!(other.user_vote, None);
    }

    #[tokio::test]
    async fn test_target_view_missing_target() {
        let f = fixture();
        let target = TargetRef::review(Uuid::new_v4());
        let err = f
            .service
            .target_view(Uuid::new_v4(), &TargetSelector::from(target))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::TargetNotFound(target));
    }
}
