//! Top-N / bottom-N ranking by average vote.
//!
//! One grouped query against the store produces the ordered
//! `(subject_id, average)` pairs; the subjects are then hydrated in a single
//! batch through the host's [`SubjectHydrator`]. Ids that no longer resolve
//! to a live entity are dropped from the result, so a ranking may come back
//! shorter than its limit even when more matching rows exist. That shrink is
//! deliberate best-effort behavior, not an error.

use std::sync::Arc;

use tracing::debug;
use voting_repository::VoteRepository;
use voting_shared::hydration::SubjectHydrator;
use voting_shared::types::{RankDirection, RankQuery, RankWindow, SubjectId};

use crate::VotingError;

/// Default number of subjects a ranking returns when the caller has no
/// particular limit in mind.
pub const DEFAULT_RANK_LIMIT: i64 = 10;

/// Runs rank queries and hydrates their results.
pub struct RankQueryEngine {
    repository: Arc<dyn VoteRepository>,
}

impl RankQueryEngine {
    pub fn new(repository: Arc<dyn VoteRepository>) -> Self {
        Self { repository }
    }

    /// The top `limit` subjects by average vote, highest first, restricted
    /// to strictly positive averages and optionally to a `cast_at` window.
    ///
    /// Averages are truncated toward zero to integers at this boundary.
    pub async fn top_ranked<H: SubjectHydrator>(
        &self,
        hydrator: &H,
        limit: i64,
        window: Option<RankWindow>,
    ) -> Result<Vec<(H::Subject, i64)>, VotingError> {
        self.ranked(hydrator, RankDirection::Top, limit, window).await
    }

    /// Mirror of [`RankQueryEngine::top_ranked`]: strictly negative averages,
    /// most negative first.
    pub async fn bottom_ranked<H: SubjectHydrator>(
        &self,
        hydrator: &H,
        limit: i64,
        window: Option<RankWindow>,
    ) -> Result<Vec<(H::Subject, i64)>, VotingError> {
        self.ranked(hydrator, RankDirection::Bottom, limit, window).await
    }

    async fn ranked<H: SubjectHydrator>(
        &self,
        hydrator: &H,
        direction: RankDirection,
        limit: i64,
        window: Option<RankWindow>,
    ) -> Result<Vec<(H::Subject, i64)>, VotingError> {
        let subject_type = hydrator.subject_type();
        let query = RankQuery::new(direction, limit, window);
        let rows = self.repository.rank_query(subject_type, &query).await?;

        let ids: Vec<SubjectId> = rows.iter().map(|(id, _)| *id).collect();
        let mut subjects = hydrator.load_batch(&ids).await?;
        if subjects.len() < ids.len() {
            debug!(
                subject_type = subject_type.as_str(),
                requested = ids.len(),
                resolved = subjects.len(),
                "dropping ranked subjects that no longer hydrate"
            );
        }

        Ok(rows
            .into_iter()
            .filter_map(|(id, average)| {
                subjects.remove(&id).map(|subject| (subject, average.trunc() as i64))
            })
            .collect())
    }
}
