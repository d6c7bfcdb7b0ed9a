use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;
use votes_shared::types::{Rating, TargetKind, TargetRef, Vote, VoteTally};

use crate::{LedgerError, VoteLedger};

const VOTE_COLUMNS: &str = "id, voter_id, target_kind, target_id, rating, text, created_at";

#[derive(sqlx::FromRow)]
struct VoteRow {
    id: Uuid,
    voter_id: Uuid,
    target_kind: i16,
    target_id: Uuid,
    rating: Option<i16>,
    text: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = LedgerError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        let kind = TargetKind::from_code(row.target_kind)
            .ok_or(LedgerError::InvalidTargetKind(row.target_kind))?;
        Ok(Vote {
            id: row.id,
            voter_id: row.voter_id,
            target: TargetRef::new(kind, row.target_id),
            rating: row.rating.map_or(Rating::NoInfo, Rating::Value),
            text: row.text,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL implementation of the vote ledger.
///
/// The `votes_voter_target_key` unique constraint is what finally decides a race
/// between two inserts for the same (voter, target) slot.
pub struct PostgresVoteLedger {
    pool: sqlx::PgPool,
}

impl PostgresVoteLedger {
    /// Creates a new PostgreSQL ledger instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with the `votes` table migrated
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error, target: TargetRef) -> LedgerError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            LedgerError::DuplicateVote(target)
        }
        _ => LedgerError::DatabaseError(err),
    }
}

#[async_trait]
impl VoteLedger for PostgresVoteLedger {
    async fn find_vote(
        &self,
        voter_id: Uuid,
        target: TargetRef,
    ) -> Result<Option<Vote>, LedgerError> {
        let row: Option<VoteRow> = sqlx::query_as(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE voter_id = $1 AND target_kind = $2 AND target_id = $3"
        ))
        .bind(voter_id)
        .bind(target.kind.code())
        .bind(target.id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vote::try_from).transpose()
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<Vote, LedgerError> {
        let row: VoteRow = sqlx::query_as(&format!(
            "INSERT INTO votes ({VOTE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {VOTE_COLUMNS}"
        ))
        .bind(vote.id)
        .bind(vote.voter_id)
        .bind(vote.target.kind.code())
        .bind(vote.target.id)
        .bind(vote.rating.as_value())
        .bind(vote.text.as_deref())
        .bind(vote.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, vote.target))?;

        debug!(vote_id = %row.id, target = %vote.target, "Inserted vote");
        Vote::try_from(row)
    }

    async fn delete_vote(
        &self,
        voter_id: Uuid,
        target: TargetRef,
    ) -> Result<Option<Vote>, LedgerError> {
        let row: Option<VoteRow> = sqlx::query_as(&format!(
            "DELETE FROM votes WHERE voter_id = $1 AND target_kind = $2 AND target_id = $3 RETURNING {VOTE_COLUMNS}"
        ))
        .bind(voter_id)
        .bind(target.kind.code())
        .bind(target.id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vote::try_from).transpose()
    }

    async fn delete_vote_by_id(&self, id: Uuid) -> Result<Option<Vote>, LedgerError> {
        let row: Option<VoteRow> = sqlx::query_as(&format!(
            "DELETE FROM votes WHERE id = $1 RETURNING {VOTE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vote::try_from).transpose()
    }

    async fn tally(&self, target: TargetRef) -> Result<VoteTally, LedgerError> {
        let (positive, negative, neutral, uncounted): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE rating > 0),
                COUNT(*) FILTER (WHERE rating < 0),
                COUNT(*) FILTER (WHERE rating = 0),
                COUNT(*) FILTER (WHERE rating IS NULL)
            FROM votes
            WHERE target_kind = $1 AND target_id = $2
            "#,
        )
        .bind(target.kind.code())
        .bind(target.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(VoteTally {
            positive,
            negative,
            neutral,
            uncounted,
        })
    }
}
