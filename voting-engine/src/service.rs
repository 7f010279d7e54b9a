//! The voting service façade.
//!
//! Wires the recorder, aggregator and rank query engine over one shared
//! repository handle. The components never share in-process state; every
//! query re-derives from the stored rows, so a score read immediately after
//! a concurrent vote may be stale by that one vote and no more.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use voting_repository::VoteRepository;
use voting_shared::hydration::SubjectHydrator;
use voting_shared::identity::VoterIdentity;
use voting_shared::types::{RankWindow, SubjectId, SubjectRef, SubjectScore, SubjectType, Vote};

use crate::window::{iso_week_window, month_window};
use crate::{RankQueryEngine, ScoreAggregator, VoteRecorder, VotingError};

/// High-level entry point for recording votes and querying scores and
/// rankings.
pub struct VotingService {
    recorder: VoteRecorder,
    aggregator: ScoreAggregator,
    ranking: RankQueryEngine,
    repository: Arc<dyn VoteRepository>,
}

impl VotingService {
    pub fn new(repository: Arc<dyn VoteRepository>) -> Self {
        Self {
            recorder: VoteRecorder::new(repository.clone()),
            aggregator: ScoreAggregator::new(repository.clone()),
            ranking: RankQueryEngine::new(repository.clone()),
            repository,
        }
    }

    /// Records a vote; see [`VoteRecorder::record_vote`] for the state
    /// machine and the meaning of the returned boolean.
    pub async fn record_vote(
        &self,
        subject: SubjectRef,
        magnitude: i16,
        address: IpAddr,
        identity: &dyn VoterIdentity,
    ) -> Result<bool, VotingError> {
        self.recorder
            .record_vote(subject, magnitude, address, identity)
            .await
    }

    pub async fn score_for(&self, subject: SubjectRef) -> Result<SubjectScore, VotingError> {
        self.aggregator.score_for(subject).await
    }

    pub async fn scores_for(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
    ) -> Result<HashMap<SubjectId, SubjectScore>, VotingError> {
        self.aggregator.scores_for(subject_type, subject_ids).await
    }

    pub async fn top_ranked<H: SubjectHydrator>(
        &self,
        hydrator: &H,
        limit: i64,
        window: Option<RankWindow>,
    ) -> Result<Vec<(H::Subject, i64)>, VotingError> {
        self.ranking.top_ranked(hydrator, limit, window).await
    }

    pub async fn bottom_ranked<H: SubjectHydrator>(
        &self,
        hydrator: &H,
        limit: i64,
        window: Option<RankWindow>,
    ) -> Result<Vec<(H::Subject, i64)>, VotingError> {
        self.ranking.bottom_ranked(hydrator, limit, window).await
    }

    /// Top subjects of an ISO week, defaulting to the current week and year.
    pub async fn top_of_week<H: SubjectHydrator>(
        &self,
        hydrator: &H,
        iso_week: Option<u32>,
        iso_year: Option<i32>,
        limit: i64,
    ) -> Result<Vec<(H::Subject, i64)>, VotingError> {
        let window = iso_week_window(iso_week, iso_year, Utc::now())?;
        self.ranking.top_ranked(hydrator, limit, Some(window)).await
    }

    /// Top subjects of a month, where "month" is a fixed 30-day window: the
    /// trailing 30 days when no month is given, otherwise 30 days from the
    /// first of that month.
    pub async fn top_of_month<H: SubjectHydrator>(
        &self,
        hydrator: &H,
        month: Option<u32>,
        year: Option<i32>,
        limit: i64,
    ) -> Result<Vec<(H::Subject, i64)>, VotingError> {
        let window = month_window(month, year, Utc::now())?;
        self.ranking.top_ranked(hydrator, limit, Some(window)).await
    }

    /// The vote the given identity cast on `subject`, or `None` when it
    /// never voted or is not authenticated.
    pub async fn vote_by_user(
        &self,
        subject: SubjectRef,
        identity: &dyn VoterIdentity,
    ) -> Result<Option<Vote>, VotingError> {
        match identity.effective_voter() {
            Some(voter) => Ok(self.repository.find_for_voter(&subject, voter).await?),
            None => Ok(None),
        }
    }

    /// The votes the given identity cast on a batch of subjects, one query.
    /// Unauthenticated identities get an empty map.
    pub async fn votes_by_user_bulk(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
        identity: &dyn VoterIdentity,
    ) -> Result<HashMap<SubjectId, Vote>, VotingError> {
        match identity.effective_voter() {
            Some(voter) => Ok(self
                .repository
                .find_for_voter_bulk(subject_type, subject_ids, voter)
                .await?),
            None => Ok(HashMap::new()),
        }
    }
}
