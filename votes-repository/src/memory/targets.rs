use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;
use votes_shared::types::{CounterDelta, TargetKind, VoteCounters};

use crate::{TargetRepository, TargetRepositoryError};

/// Target store for one kind of entity, held in memory.
pub struct InMemoryTargetRepository {
    kind: TargetKind,
    targets: Mutex<HashMap<Uuid, VoteCounters>>,
}

impl InMemoryTargetRepository {
    pub fn new(kind: TargetKind) -> Self {
        Self {
            kind,
            targets: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, VoteCounters>>, TargetRepositoryError> {
        self.targets
            .lock()
            .map_err(|_| TargetRepositoryError::unavailable("target store lock poisoned"))
    }

    /// Adds an entity with zeroed counters. Existing entities are left untouched.
    pub fn insert(&self, id: Uuid) {
        if let Ok(mut targets) = self.lock() {
            targets.entry(id).or_insert_with(|| VoteCounters::empty(self.kind));
        }
    }

    pub fn with_targets(self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        for id in ids {
            self.insert(id);
        }
        self
    }

    pub fn remove(&self, id: Uuid) {
        if let Ok(mut targets) = self.lock() {
            targets.remove(&id);
        }
    }

    pub fn counters(&self, id: Uuid) -> Option<VoteCounters> {
        self.lock().ok().and_then(|targets| targets.get(&id).copied())
    }
}

#[async_trait]
impl TargetRepository for InMemoryTargetRepository {
    fn kind(&self) -> TargetKind {
        self.kind
    }

    async fn exists(&self, id: Uuid) -> Result<bool, TargetRepositoryError> {
        Ok(self.lock()?.contains_key(&id))
    }

    async fn increment_counters(
        &self,
        id: Uuid,
        delta: &CounterDelta,
    ) -> Result<Option<VoteCounters>, TargetRepositoryError> {
        let mut targets = self.lock()?;
        Ok(targets.get_mut(&id).map(|counters| {
            *counters = counters.with_delta(delta);
            *counters
        }))
    }

    async fn get_counters(&self, id: Uuid) -> Result<Option<VoteCounters>, TargetRepositoryError> {
        Ok(self.lock()?.get(&id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votes_shared::types::Rating;

    #[tokio::test]
    async fn test_increment_unknown_target() {
        let repository = InMemoryTargetRepository::new(TargetKind::Claim);
        let result = repository
            .increment_counters(Uuid::new_v4(), &CounterDelta::apply(Rating::POSITIVE))
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_increment_returns_updated_counters() {
        let id = Uuid::new_v4();
        let repository = InMemoryTargetRepository::new(TargetKind::Review).with_targets([id]);

        repository.increment_counters(id, &CounterDelta::apply(Rating::NEUTRAL)).await.unwrap();
        let counters = repository
            .increment_counters(id, &CounterDelta::apply(Rating::NEGATIVE))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(counters.n_been_voted, 2);
        assert_eq!(counters.n_negative_votes, 1);
        assert_eq!(counters.n_neutral_votes, Some(1));
        assert!(repository.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_keeps_existing_counters() {
        let id = Uuid::new_v4();
        let repository = InMemoryTargetRepository::new(TargetKind::User).with_targets([id]);
        repository.increment_counters(id, &CounterDelta::apply(Rating::POSITIVE)).await.unwrap();

        repository.insert(id);

        assert_eq!(repository.counters(id).unwrap().n_positive_votes, 1);
    }
}
