//! Tests for the recorder's behavior when two calls race on the same
//! identity key: the loser of a create race must converge to an update, and
//! a doubly-lost race must surface as a retryable conflict rather than a
//! duplicate row.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use voting_engine::{VotingError, VotingService};
use voting_repository::{MemoryVoteRepository, VoteRepository, VoteRepositoryError};
use voting_shared::identity::VoterIdentity;
use voting_shared::types::{
    Magnitude, RankQuery, SubjectAggregate, SubjectId, SubjectRef, SubjectType, Vote,
    VoteIdentity, VoterId,
};

const ITEMS: SubjectType = SubjectType("item");

struct User(VoterId);

impl VoterIdentity for User {
    fn is_authenticated(&self) -> bool {
        true
    }

    fn voter_id(&self) -> VoterId {
        self.0
    }
}

/// Wraps the in-memory repository but always reports absence on the identity
/// lookup, as if a concurrent call inserted the row between the recorder's
/// read and its write.
struct StaleReadRepository {
    inner: MemoryVoteRepository,
}

#[async_trait::async_trait]
impl VoteRepository for StaleReadRepository {
    async fn find_by_identity(
        &self,
        _identity: &VoteIdentity,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        Ok(None)
    }

    async fn insert(
        &self,
        identity: &VoteIdentity,
        magnitude: Magnitude,
        cast_at: DateTime<Utc>,
    ) -> Result<Vote, VoteRepositoryError> {
        self.inner.insert(identity, magnitude, cast_at).await
    }

    async fn update_magnitude(
        &self,
        identity: &VoteIdentity,
        magnitude: Magnitude,
    ) -> Result<bool, VoteRepositoryError> {
        self.inner.update_magnitude(identity, magnitude).await
    }

    async fn delete_by_identity(
        &self,
        identity: &VoteIdentity,
    ) -> Result<(), VoteRepositoryError> {
        self.inner.delete_by_identity(identity).await
    }

    async fn aggregate_for_subject(
        &self,
        subject: &SubjectRef,
    ) -> Result<SubjectAggregate, VoteRepositoryError> {
        self.inner.aggregate_for_subject(subject).await
    }

    async fn aggregate_for_subjects(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
    ) -> Result<HashMap<SubjectId, SubjectAggregate>, VoteRepositoryError> {
        self.inner.aggregate_for_subjects(subject_type, subject_ids).await
    }

    async fn rank_query(
        &self,
        subject_type: SubjectType,
        query: &RankQuery,
    ) -> Result<Vec<(SubjectId, f64)>, VoteRepositoryError> {
        self.inner.rank_query(subject_type, query).await
    }

    async fn find_for_voter(
        &self,
        subject: &SubjectRef,
        voter: VoterId,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        self.inner.find_for_voter(subject, voter).await
    }

    async fn find_for_voter_bulk(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
        voter: VoterId,
    ) -> Result<HashMap<SubjectId, Vote>, VoteRepositoryError> {
        self.inner
            .find_for_voter_bulk(subject_type, subject_ids, voter)
            .await
    }
}

/// A repository where both sides of the race are lost: the insert hits the
/// unique index and the row is gone again by the time the update runs.
struct ContendedRepository {
    inner: MemoryVoteRepository,
}

#[async_trait::async_trait]
impl VoteRepository for ContendedRepository {
    async fn find_by_identity(
        &self,
        _identity: &VoteIdentity,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        Ok(None)
    }

    async fn insert(
        &self,
        _identity: &VoteIdentity,
        _magnitude: Magnitude,
        _cast_at: DateTime<Utc>,
    ) -> Result<Vote, VoteRepositoryError> {
        Err(VoteRepositoryError::DuplicateVote)
    }

    async fn update_magnitude(
        &self,
        _identity: &VoteIdentity,
        _magnitude: Magnitude,
    ) -> Result<bool, VoteRepositoryError> {
        Ok(false)
    }

    async fn delete_by_identity(
        &self,
        identity: &VoteIdentity,
    ) -> Result<(), VoteRepositoryError> {
        self.inner.delete_by_identity(identity).await
    }

    async fn aggregate_for_subject(
        &self,
        subject: &SubjectRef,
    ) -> Result<SubjectAggregate, VoteRepositoryError> {
        self.inner.aggregate_for_subject(subject).await
    }

    async fn aggregate_for_subjects(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
    ) -> Result<HashMap<SubjectId, SubjectAggregate>, VoteRepositoryError> {
        self.inner.aggregate_for_subjects(subject_type, subject_ids).await
    }

    async fn rank_query(
        &self,
        subject_type: SubjectType,
        query: &RankQuery,
    ) -> Result<Vec<(SubjectId, f64)>, VoteRepositoryError> {
        self.inner.rank_query(subject_type, query).await
    }

    async fn find_for_voter(
        &self,
        subject: &SubjectRef,
        voter: VoterId,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        self.inner.find_for_voter(subject, voter).await
    }

    async fn find_for_voter_bulk(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
        voter: VoterId,
    ) -> Result<HashMap<SubjectId, Vote>, VoteRepositoryError> {
        self.inner
            .find_for_voter_bulk(subject_type, subject_ids, voter)
            .await
    }
}

fn address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))
}

fn item(id: SubjectId) -> SubjectRef {
    SubjectRef::new(ITEMS, id)
}

#[tokio::test]
async fn losing_a_create_race_converges_to_an_update() {
    let inner = MemoryVoteRepository::new();
    let key = VoteIdentity {
        voter: Some(1),
        address: address(),
        subject: item(1),
    };
    // The row the concurrent winner inserted.
    inner
        .insert(&key, Magnitude::new(2).unwrap(), Utc::now())
        .await
        .unwrap();

    let repository = Arc::new(StaleReadRepository { inner });
    let service = VotingService::new(repository.clone());

    let changed = service
        .record_vote(item(1), 4, address(), &User(1))
        .await
        .unwrap();

    // The loser's vote lands as an update of the winner's row.
    assert!(changed);
    assert_eq!(repository.inner.row_count(), 1);
    let vote = repository.inner.find_for_voter(&item(1), 1).await.unwrap().unwrap();
    assert_eq!(vote.magnitude.value(), 4);
}

#[tokio::test]
async fn losing_both_sides_of_the_race_surfaces_a_conflict() {
    let repository = Arc::new(ContendedRepository {
        inner: MemoryVoteRepository::new(),
    });
    let service = VotingService::new(repository);

    let err = service
        .record_vote(item(1), 4, address(), &User(1))
        .await
        .unwrap_err();

    assert!(matches!(err, VotingError::Conflict));
}
