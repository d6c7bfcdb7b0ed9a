use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;
use votes_shared::types::{CounterDelta, TargetKind, VoteCounters};

use crate::{TargetRepository, TargetRepositoryError};

#[derive(sqlx::FromRow)]
struct CountersRow {
    n_been_voted: i64,
    n_positive_votes: i64,
    n_negative_votes: i64,
    #[sqlx(default)]
    n_neutral_votes: Option<i64>,
}

impl CountersRow {
    fn into_counters(self, kind: TargetKind) -> VoteCounters {
        VoteCounters {
            n_been_voted: self.n_been_voted,
            n_positive_votes: self.n_positive_votes,
            n_negative_votes: self.n_negative_votes,
            n_neutral_votes: kind
                .has_neutral_counter()
                .then(|| self.n_neutral_votes.unwrap_or(0)),
        }
    }
}

/// PostgreSQL target store for one kind of votable entity.
///
/// Counters are only ever changed with relative increments so that concurrent
/// votes from different voters on the same target never lose updates.
pub struct PostgresTargetRepository {
    pool: sqlx::PgPool,
    kind: TargetKind,
}

impl PostgresTargetRepository {
    pub fn new(pool: sqlx::PgPool, kind: TargetKind) -> Self {
        Self { pool, kind }
    }

    /// One repository per target kind, all sharing `pool`.
    pub fn all(pool: &sqlx::PgPool) -> Vec<Self> {
        TargetKind::ALL
            .into_iter()
            .map(|kind| Self::new(pool.clone(), kind))
            .collect()
    }

    fn table(&self) -> &'static str {
        match self.kind {
            TargetKind::User => "users",
            TargetKind::Article => "articles",
            TargetKind::Claim => "claims",
            TargetKind::Review => "reviews",
        }
    }

    fn counter_columns(&self) -> &'static str {
        if self.kind.has_neutral_counter() {
            "n_been_voted, n_positive_votes, n_negative_votes, n_neutral_votes"
        } else {
            "n_been_voted, n_positive_votes, n_negative_votes"
        }
    }
}

#[async_trait]
impl TargetRepository for PostgresTargetRepository {
    fn kind(&self) -> TargetKind {
        self.kind
    }

    async fn exists(&self, id: Uuid) -> Result<bool, TargetRepositoryError> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            self.table()
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn increment_counters(
        &self,
        id: Uuid,
        delta: &CounterDelta,
    ) -> Result<Option<VoteCounters>, TargetRepositoryError> {
        let neutral = if self.kind.has_neutral_counter() {
            ", n_neutral_votes = n_neutral_votes + $5"
        } else {
            ""
        };
        let sql = format!(
            "UPDATE {table} SET n_been_voted = n_been_voted + $2, \
             n_positive_votes = n_positive_votes + $3, \
             n_negative_votes = n_negative_votes + $4{neutral} \
             WHERE id = $1 RETURNING {columns}",
            table = self.table(),
            columns = self.counter_columns(),
        );

        let mut query = sqlx::query_as::<_, CountersRow>(&sql)
            .bind(id)
            .bind(delta.been_voted)
            .bind(delta.positive)
            .bind(delta.negative);
        if self.kind.has_neutral_counter() {
            query = query.bind(delta.neutral);
        }

        let row = query.fetch_optional(&self.pool).await?;
        debug!(kind = %self.kind, %id, ?delta, applied = row.is_some(), "Incremented counters");
        Ok(row.map(|r| r.into_counters(self.kind)))
    }

    async fn get_counters(&self, id: Uuid) -> Result<Option<VoteCounters>, TargetRepositoryError> {
        let row: Option<CountersRow> = sqlx::query_as(&format!(
            "SELECT {} FROM {} WHERE id = $1",
            self.counter_columns(),
            self.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.into_counters(self.kind)))
    }
}
