//! Interfaces to the stores that own votable entities.
//!
//! The voting core does not own articles, claims, reviews or users. It only
//! needs to know whether one exists and to nudge its counters.
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::TargetRepositoryError;
use uuid::Uuid;
use votes_shared::types::{CounterDelta, TargetKind, VoteCounters};

/// Access to one kind of votable entity.
#[async_trait::async_trait]
pub trait TargetRepository: Send + Sync {
    /// The kind of entity this repository serves.
    fn kind(&self) -> TargetKind;

    async fn exists(&self, id: Uuid) -> Result<bool, TargetRepositoryError>;

    /// Applies `delta` as an atomic relative increment.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(VoteCounters))` - The counters after the increment
    /// * `Ok(None)` - The entity does not exist (any more)
    /// * `Err(TargetRepositoryError)` - Storage failure
    async fn increment_counters(
        &self,
        id: Uuid,
        delta: &CounterDelta,
    ) -> Result<Option<VoteCounters>, TargetRepositoryError>;

    async fn get_counters(&self, id: Uuid) -> Result<Option<VoteCounters>, TargetRepositoryError>;
}

/// Maps each [`TargetKind`] to the repository that serves it.
#[derive(Clone, Default)]
pub struct TargetRegistry {
    repositories: HashMap<TargetKind, Arc<dyn TargetRepository>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a repository under the kind it reports.
    ///
    /// A later registration for the same kind replaces the earlier one.
    pub fn register(&mut self, repository: Arc<dyn TargetRepository>) {
        self.repositories.insert(repository.kind(), repository);
    }

    pub fn with(mut self, repository: Arc<dyn TargetRepository>) -> Self {
        self.register(repository);
        self
    }

    pub fn get(&self, kind: TargetKind) -> Result<&Arc<dyn TargetRepository>, TargetRepositoryError> {
        self.repositories
            .get(&kind)
            .ok_or(TargetRepositoryError::UnregisteredKind(kind))
    }

    pub fn kinds(&self) -> impl Iterator<Item = TargetKind> + '_ {
        self.repositories.keys().copied()
    }
}
