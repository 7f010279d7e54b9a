//! In-memory vote repository for testing and local development.
//!
//! `MemoryVoteRepository` implements the full `VoteRepository` contract over
//! a `Vec` behind a lock, with the same observable semantics as the
//! PostgreSQL backend: identity uniqueness, null-coalesced aggregates and
//! sign-filtered rank queries. Tests can exercise the recorder, aggregator
//! and ranking layers against it without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use voting_shared::types::{
    Magnitude, RankDirection, RankQuery, SubjectAggregate, SubjectId, SubjectRef, SubjectType,
    Vote, VoteIdentity, VoterId,
};

use crate::{VoteRepository, VoteRepositoryError};

/// In-memory implementation of the vote repository.
#[derive(Default)]
pub struct MemoryVoteRepository {
    votes: RwLock<Vec<Vote>>,
    next_id: AtomicI64,
}

impl MemoryVoteRepository {
    pub fn new() -> Self {
        Self {
            votes: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of rows currently stored, across all subjects.
    pub fn row_count(&self) -> usize {
        self.votes.read().expect("vote store lock poisoned").len()
    }

    fn in_window(vote: &Vote, query: &RankQuery) -> bool {
        match query.window {
            Some(window) => vote.cast_at >= window.from && vote.cast_at <= window.to,
            None => true,
        }
    }
}

#[async_trait]
impl VoteRepository for MemoryVoteRepository {
    async fn find_by_identity(
        &self,
        identity: &VoteIdentity,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        let votes = self.votes.read().expect("vote store lock poisoned");
        Ok(votes.iter().find(|v| v.identity() == *identity).cloned())
    }

    async fn insert(
        &self,
        identity: &VoteIdentity,
        magnitude: Magnitude,
        cast_at: DateTime<Utc>,
    ) -> Result<Vote, VoteRepositoryError> {
        let mut votes = self.votes.write().expect("vote store lock poisoned");
        if votes.iter().any(|v| v.identity() == *identity) {
            return Err(VoteRepositoryError::DuplicateVote);
        }

        let vote = Vote {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            voter: identity.voter,
            address: identity.address,
            subject: identity.subject,
            magnitude,
            cast_at,
        };
        votes.push(vote.clone());
        Ok(vote)
    }

    async fn update_magnitude(
        &self,
        identity: &VoteIdentity,
        magnitude: Magnitude,
    ) -> Result<bool, VoteRepositoryError> {
        let mut votes = self.votes.write().expect("vote store lock poisoned");
        match votes.iter_mut().find(|v| v.identity() == *identity) {
            Some(vote) => {
                vote.magnitude = magnitude;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_identity(
        &self,
        identity: &VoteIdentity,
    ) -> Result<(), VoteRepositoryError> {
        let mut votes = self.votes.write().expect("vote store lock poisoned");
        votes.retain(|v| v.identity() != *identity);
        Ok(())
    }

    async fn aggregate_for_subject(
        &self,
        subject: &SubjectRef,
    ) -> Result<SubjectAggregate, VoteRepositoryError> {
        let votes = self.votes.read().expect("vote store lock poisoned");
        let mut sum: i64 = 0;
        let mut count: i64 = 0;
        for vote in votes.iter().filter(|v| v.subject == *subject) {
            sum += i64::from(vote.magnitude.value());
            count += 1;
        }

        Ok(SubjectAggregate {
            sum: (count > 0).then_some(sum),
            count,
        })
    }

    async fn aggregate_for_subjects(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
    ) -> Result<HashMap<SubjectId, SubjectAggregate>, VoteRepositoryError> {
        let votes = self.votes.read().expect("vote store lock poisoned");
        let mut aggregates: HashMap<SubjectId, SubjectAggregate> = HashMap::new();
        for vote in votes.iter().filter(|v| {
            v.subject.subject_type == subject_type
                && subject_ids.contains(&v.subject.subject_id)
        }) {
            let entry = aggregates
                .entry(vote.subject.subject_id)
                .or_insert(SubjectAggregate::EMPTY);
            entry.sum = Some(entry.sum.unwrap_or(0) + i64::from(vote.magnitude.value()));
            entry.count += 1;
        }

        Ok(aggregates)
    }

    async fn rank_query(
        &self,
        subject_type: SubjectType,
        query: &RankQuery,
    ) -> Result<Vec<(SubjectId, f64)>, VoteRepositoryError> {
        let votes = self.votes.read().expect("vote store lock poisoned");
        let mut groups: HashMap<SubjectId, (i64, i64)> = HashMap::new();
        for vote in votes.iter().filter(|v| {
            v.subject.subject_type == subject_type && Self::in_window(v, query)
        }) {
            let entry = groups.entry(vote.subject.subject_id).or_insert((0, 0));
            entry.0 += i64::from(vote.magnitude.value());
            entry.1 += 1;
        }

        let mut ranked: Vec<(SubjectId, f64)> = groups
            .into_iter()
            .map(|(id, (sum, count))| (id, sum as f64 / count as f64))
            .filter(|(_, average)| match query.direction {
                RankDirection::Top => *average > 0.0,
                RankDirection::Bottom => *average < 0.0,
            })
            .collect();

        // Postgres only orders by the average; ties break on subject id here
        // to keep results deterministic for tests.
        match query.direction {
            RankDirection::Top => ranked.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            }),
            RankDirection::Bottom => ranked.sort_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            }),
        }
        ranked.truncate(query.limit.max(0) as usize);

        Ok(ranked)
    }

    async fn find_for_voter(
        &self,
        subject: &SubjectRef,
        voter: VoterId,
    ) -> Result<Option<Vote>, VoteRepositoryError> {
        let votes = self.votes.read().expect("vote store lock poisoned");
        Ok(votes
            .iter()
            .filter(|v| v.voter == Some(voter) && v.subject == *subject)
            .max_by_key(|v| v.cast_at)
            .cloned())
    }

    async fn find_for_voter_bulk(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
        voter: VoterId,
    ) -> Result<HashMap<SubjectId, Vote>, VoteRepositoryError> {
        let votes = self.votes.read().expect("vote store lock poisoned");
        let mut found = HashMap::new();
        for vote in votes.iter().filter(|v| {
            v.voter == Some(voter)
                && v.subject.subject_type == subject_type
                && subject_ids.contains(&v.subject.subject_id)
        }) {
            found.insert(vote.subject.subject_id, vote.clone());
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    const ITEMS: SubjectType = SubjectType("item");

    fn identity(voter: Option<VoterId>, subject_id: SubjectId) -> VoteIdentity {
        VoteIdentity {
            voter,
            address: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)),
            subject: SubjectRef::new(ITEMS, subject_id),
        }
    }

    fn magnitude(value: i16) -> Magnitude {
        Magnitude::new(value).unwrap()
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_identity() {
        let repository = MemoryVoteRepository::new();
        let key = identity(Some(7), 1);

        repository.insert(&key, magnitude(3), Utc::now()).await.unwrap();
        let err = repository
            .insert(&key, magnitude(4), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, VoteRepositoryError::DuplicateVote));
        assert_eq!(repository.row_count(), 1);
    }

    #[tokio::test]
    async fn anonymous_votes_share_an_identity_per_address() {
        let repository = MemoryVoteRepository::new();
        let key = identity(None, 1);

        repository.insert(&key, magnitude(5), Utc::now()).await.unwrap();
        let err = repository
            .insert(&key, magnitude(1), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, VoteRepositoryError::DuplicateVote));
    }

    #[tokio::test]
    async fn delete_of_absent_row_is_a_no_op() {
        let repository = MemoryVoteRepository::new();
        repository.delete_by_identity(&identity(Some(1), 9)).await.unwrap();
        assert_eq!(repository.row_count(), 0);
    }

    #[tokio::test]
    async fn aggregate_reports_null_sum_for_unvoted_subject() {
        let repository = MemoryVoteRepository::new();
        let aggregate = repository
            .aggregate_for_subject(&SubjectRef::new(ITEMS, 42))
            .await
            .unwrap();

        assert_eq!(aggregate, SubjectAggregate::EMPTY);
    }

    #[tokio::test]
    async fn update_magnitude_reports_missing_row() {
        let repository = MemoryVoteRepository::new();
        let updated = repository
            .update_magnitude(&identity(Some(1), 1), magnitude(2))
            .await
            .unwrap();
        assert!(!updated);
    }
}
