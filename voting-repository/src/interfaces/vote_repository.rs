//! This module defines the `VoteRepository` trait, which provides an
//! interface for interacting with the underlying store of vote rows. It
//! abstracts the database operations for persistence, aggregation and
//! ranking; nothing above this trait sees SQL or vendor aggregate quirks.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use voting_shared::types::{
    Magnitude, RankQuery, SubjectAggregate, SubjectId, SubjectRef, SubjectType, Vote,
    VoteIdentity, VoterId,
};

use crate::errors::VoteRepositoryError;

/// A trait that defines the interface for the vote store.
///
/// Implementors own the persisted vote rows and enforce the uniqueness
/// invariant: at most one row per `(voter-or-null, address, subject)` key.
/// All reads re-derive from stored rows; implementations must not keep a
/// vote ledger or cache that can diverge from them.
#[async_trait::async_trait]
pub trait VoteRepository: Send + Sync {
    /// Looks up the vote stored under the full identity key.
    ///
    /// Absence is a normal result, reported as `Ok(None)`.
    async fn find_by_identity(
        &self,
        identity: &VoteIdentity,
    ) -> Result<Option<Vote>, VoteRepositoryError>;

    /// Inserts a fresh vote row for the identity key.
    ///
    /// # Returns
    ///
    /// The stored vote, or `VoteRepositoryError::DuplicateVote` when a row
    /// for the key already exists (a concurrent insert won the race).
    async fn insert(
        &self,
        identity: &VoteIdentity,
        magnitude: Magnitude,
        cast_at: DateTime<Utc>,
    ) -> Result<Vote, VoteRepositoryError>;

    /// Overwrites the magnitude of the row stored under the identity key,
    /// leaving `cast_at` untouched.
    ///
    /// # Returns
    ///
    /// `true` when a row was updated, `false` when no row exists for the key
    /// (it was deleted under a racing retraction).
    async fn update_magnitude(
        &self,
        identity: &VoteIdentity,
        magnitude: Magnitude,
    ) -> Result<bool, VoteRepositoryError>;

    /// Deletes the row stored under the identity key. Deleting an absent row
    /// is a no-op, not an error.
    async fn delete_by_identity(&self, identity: &VoteIdentity)
        -> Result<(), VoteRepositoryError>;

    /// Computes `(sum, count)` over all votes for one subject. `sum` is
    /// `None` when the subject has no votes.
    async fn aggregate_for_subject(
        &self,
        subject: &SubjectRef,
    ) -> Result<SubjectAggregate, VoteRepositoryError>;

    /// Computes `(sum, count)` per subject for a batch of subject ids in a
    /// single grouped query. Subjects with no votes are absent from the map;
    /// absence is equivalent to `{sum: None, count: 0}`.
    async fn aggregate_for_subjects(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
    ) -> Result<HashMap<SubjectId, SubjectAggregate>, VoteRepositoryError>;

    /// Runs the grouped rank query: votes of `subject_type`, filtered to the
    /// `cast_at` window when one is given, grouped by subject id, restricted
    /// to groups whose average is on the requested side of zero, ordered by
    /// average and truncated to the query limit.
    ///
    /// # Returns
    ///
    /// Ordered `(subject_id, average)` pairs.
    async fn rank_query(
        &self,
        subject_type: SubjectType,
        query: &RankQuery,
    ) -> Result<Vec<(SubjectId, f64)>, VoteRepositoryError>;

    /// Looks up the vote an authenticated voter cast on a subject,
    /// regardless of the address it was cast from.
    async fn find_for_voter(
        &self,
        subject: &SubjectRef,
        voter: VoterId,
    ) -> Result<Option<Vote>, VoteRepositoryError>;

    /// Looks up the votes an authenticated voter cast on a batch of subjects
    /// in a single query. Subjects the voter never voted on are absent from
    /// the map.
    async fn find_for_voter_bulk(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
        voter: VoterId,
    ) -> Result<HashMap<SubjectId, Vote>, VoteRepositoryError>;
}
