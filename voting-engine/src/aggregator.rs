//! Score aggregation over stored votes.

use std::collections::HashMap;
use std::sync::Arc;

use voting_repository::VoteRepository;
use voting_shared::types::{SubjectId, SubjectRef, SubjectScore, SubjectType};

use crate::VotingError;

/// Computes score and vote-count summaries for subjects, always re-deriving
/// from stored rows.
pub struct ScoreAggregator {
    repository: Arc<dyn VoteRepository>,
}

impl ScoreAggregator {
    pub fn new(repository: Arc<dyn VoteRepository>) -> Self {
        Self { repository }
    }

    /// Score summary for one subject. A subject with no votes scores exactly
    /// `0.0` with `num_votes == 0`.
    pub async fn score_for(&self, subject: SubjectRef) -> Result<SubjectScore, VotingError> {
        let aggregate = self.repository.aggregate_for_subject(&subject).await?;
        Ok(SubjectScore::from(aggregate))
    }

    /// Score summaries for a batch of subjects, computed as one grouped
    /// aggregate. Subjects with no votes are absent from the map; absence is
    /// equivalent to `SubjectScore::UNVOTED`.
    pub async fn scores_for(
        &self,
        subject_type: SubjectType,
        subject_ids: &[SubjectId],
    ) -> Result<HashMap<SubjectId, SubjectScore>, VotingError> {
        let aggregates = self
            .repository
            .aggregate_for_subjects(subject_type, subject_ids)
            .await?;

        Ok(aggregates
            .into_iter()
            .map(|(id, aggregate)| (id, SubjectScore::from(aggregate)))
            .collect())
    }
}
