//! PostgreSQL implementation of the vote repository.
//!
//! Provides a production PostgreSQL backend for the `VoteRepository` trait
//! with connection pooling and grouped aggregate queries.
//!
//! ## Database Tables
//!
//! - `votes`: one row per effective vote, unique on
//!   `(voter_id, address, subject_type, subject_id)` with nulls not distinct
//!   so anonymous votes behind one address collide by design.
use std::collections::HashMap;
use std::net::IpAddr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::debug;
use voting_shared::types::{
    Magnitude, RankDirection, RankQuery, SubjectAggregate, SubjectId, SubjectRef, SubjectType,
    Vote, VoteIdentity, VoterId,
};

use super::PostgresRepositoryConfig;
use crate::{VoteRepository, VoteRepositoryError};

const TOP_RANK_SQL: &str = r#"
SELECT subject_id, AVG(magnitude)::double precision AS average
FROM votes
WHERE subject_type = $1
  AND ($2::timestamptz IS NULL OR cast_at >= $2)
  AND ($3::timestamptz IS NULL OR cast_at <= $3)
GROUP BY subject_id
HAVING AVG(magnitude) > 0
ORDER BY average DESC
LIMIT $4
"#;

const BOTTOM_RANK_SQL: &str = r#"
SELECT subject_id, AVG(magnitude)::double precision AS average
FROM votes
WHERE subject_type = $1
  AND ($2::timestamptz IS NULL OR cast_at >= $2)
  AND ($3::timestamptz IS NULL OR cast_at <= $3)
GROUP BY subject_id
HAVING AVG(magnitude) < 0
ORDER BY average ASC
LIMIT $4
"#;

/// PostgreSQL implementation of the vote repository.
///
/// All operations are direct reads and writes against the pool; there is no
/// caching layer. The uniqueness invariant is enforced by the unique index
/// on the identity key, so a racing insert loses with `DuplicateVote` rather
/// than producing a second row.
pub struct PostgresVoteRepository {
    pool: sqlx::PgPool,
}

impl PostgresVoteRepository {
    /// Creates a repository over an already-configured pool.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool from the given configuration.
    pub async fn connect(
        config: &PostgresRepositoryConfig,
    ) -> Result<Self, VoteRepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Decodes a vote row. The subject type is not read back from the row:
    /// every query is already filtered to one type, which the caller knows.
    fn vote_from_row(
        row: &PgRow,
        subject_type: SubjectType,
    ) -> Result<Vote, VoteRepositoryError> {
        let address_raw: String = row.try_get("address")?;
        let address: IpAddr = address_raw
            .parse()
            .map_err(|_| VoteRepositoryError::InvalidAddress(address_raw))?;
        let magnitude_raw: i16 = row.try_get("magnitude")?;
        let magnitude = Magnitude::new(magnitude_raw)
            .map_err(|_| VoteRepositoryError::InvalidMagnitude(magnitude_raw))?;

        Ok(Vote {
            id: row.try_get("id")?,
            voter: row.try_get("voter_id")?,
            address,
            subject: SubjectRef::new(subject_type, row.try_get("subject_id")?),
            magnitude,
            cast_at: row.try_get("cast_at")?,
        })
    }

    fn map_insert_error(error: sqlx::Error) -> VoteRepositoryError {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                VoteRepositoryError::DuplicateVote
            }
            _ => VoteRepositoryError::Database(error),
        }
    }
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn find_by_identity(
        &self,
        identity: &VoteIdentity,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, voter_id, address, subject_id, magnitude, cast_at
            FROM votes
            WHERE voter_id IS NOT DISTINCT FROM $1
              AND address = $2
              AND subject_type = $3
              AND subject_id = $4
            "#,
        )
        .bind(identity.voter)
        .bind(identity.address.to_string())
        .bind(identity.subject.subject_type.as_str())
        .bind(identity.subject.subject_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::vote_from_row(&r, identity.subject.subject_type))
            .transpose()
    }

    async fn insert(
        &self,
        identity: &VoteIdentity,
        magnitude: Magnitude,
        cast_at: DateTime<Utc>,
    ) -> Result<Vote, VoteRepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO votes (voter_id, address, subject_type, subject_id, magnitude, cast_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(identity.voter)
        .bind(identity.address.to_string())
        .bind(identity.subject.subject_type.as_str())
        .bind(identity.subject.subject_id)
        .bind(magnitude.value())
        .bind(cast_at)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_insert_error)?;

        Ok(Vote {
            id,
            voter: identity.voter,
            address: identity.address,
            subject: identity.subject,
            magnitude,
            cast_at,
        })
    }

    async fn update_magnitude(
        &self,
        identity: &VoteIdentity,
        magnitude: Magnitude,
    ) -> Result<bool, VoteRepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE votes
            SET magnitude = $1
            WHERE voter_id IS NOT DISTINCT FROM $2
              AND address = $3
              AND subject_type = $4
              AND subject_id = $5
            "#,
        )
        .bind(magnitude.value())
        .bind(identity.voter)
        .bind(identity.address.to_string())
        .bind(identity.subject.subject_type.as_str())
        .bind(identity.subject.subject_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_identity(
        &self,
        identity: &VoteIdentity,
    ) -> Result<(), VoteRepositoryError> {
        sqlx::query(
            r#"
            DELETE FROM votes
            WHERE voter_id IS NOT DISTINCT FROM $1
              AND address = $2
              AND subject_type = $3
              AND subject_id = $4
            "#,
        )
        .bind(identity.voter)
        .bind(identity.address.to_string())
        .bind(identity.subject.subject_type.as_str())
        .bind(identity.subject.subject_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn aggregate_for_subject(
        &self,
        subject: &SubjectRef,
    ) -> Result<SubjectAggregate, VoteRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT SUM(magnitude)::bigint AS sum, COUNT(*) AS count
            FROM votes
            WHERE subject_type = $1 AND subject_id = $2
            "#,
        )
        .bind(subject.subject_type.as_str())
        .bind(subject.subject_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(SubjectAggregate {
            sum: row.try_get("sum")?,
            count: row.try_get("count")?,
        })
    }

    async fn aggregate_for_subjects(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
    ) -> Result<HashMap<SubjectId, SubjectAggregate>, VoteRepositoryError> {
        if subject_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i64> = subject_ids.to_vec();
        let rows = sqlx::query(
            r#"
            SELECT subject_id, SUM(magnitude)::bigint AS sum, COUNT(*) AS count
            FROM votes
            WHERE subject_type = $1 AND subject_id = ANY($2)
            GROUP BY subject_id
            "#,
        )
        .bind(subject_type.as_str())
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut aggregates = HashMap::with_capacity(rows.len());
        for row in rows {
            let subject_id: SubjectId = row.try_get("subject_id")?;
            aggregates.insert(
                subject_id,
                SubjectAggregate {
                    sum: row.try_get("sum")?,
                    count: row.try_get("count")?,
                },
            );
        }

        Ok(aggregates)
    }

    async fn rank_query(
        &self,
        subject_type: SubjectType,
        query: &RankQuery,
    ) -> Result<Vec<(SubjectId, f64)>, VoteRepositoryError> {
        let sql = match query.direction {
            RankDirection::Top => TOP_RANK_SQL,
            RankDirection::Bottom => BOTTOM_RANK_SQL,
        };
        debug!(
            subject_type = subject_type.as_str(),
            limit = query.limit,
            windowed = query.window.is_some(),
            "running rank query"
        );

        let rows = sqlx::query(sql)
            .bind(subject_type.as_str())
            .bind(query.window.map(|w| w.from))
            .bind(query.window.map(|w| w.to))
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;

        let mut ranked = Vec::with_capacity(rows.len());
        for row in rows {
            ranked.push((
                row.try_get::<SubjectId, _>("subject_id")?,
                row.try_get::<f64, _>("average")?,
            ));
        }

        Ok(ranked)
    }

    async fn find_for_voter(
        &self,
        subject: &SubjectRef,
        voter: VoterId,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, voter_id, address, subject_id, magnitude, cast_at
            FROM votes
            WHERE voter_id = $1 AND subject_type = $2 AND subject_id = $3
            ORDER BY cast_at DESC
            LIMIT 1
            "#,
        )
        .bind(voter)
        .bind(subject.subject_type.as_str())
        .bind(subject.subject_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::vote_from_row(&r, subject.subject_type))
            .transpose()
    }

    async fn find_for_voter_bulk(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
        voter: VoterId,
    ) -> Result<HashMap<SubjectId, Vote>, VoteRepositoryError> {
        if subject_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i64> = subject_ids.to_vec();
        let rows = sqlx::query(
            r#"
            SELECT id, voter_id, address, subject_id, magnitude, cast_at
            FROM votes
            WHERE voter_id = $1 AND subject_type = $2 AND subject_id = ANY($3)
            ORDER BY cast_at ASC
            "#,
        )
        .bind(voter)
        .bind(subject_type.as_str())
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut votes = HashMap::with_capacity(rows.len());
        for row in rows {
            let vote = Self::vote_from_row(&row, subject_type)?;
            votes.insert(vote.subject.subject_id, vote);
        }

        Ok(votes)
    }
}
