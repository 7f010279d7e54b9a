//! Error types for the voting engine.
//! Defines the errors surfaced to callers of the recorder, aggregator and
//! rank query engine.
use thiserror::Error;
use voting_repository::VoteRepositoryError;
use voting_shared::hydration::HydrationError;
use voting_shared::types::InvalidMagnitude;

/// Represents errors that can occur while recording or querying votes.
///
/// Absence is never an error anywhere in the engine: missing votes are
/// `Option::None`, unvoted subjects are absent map entries, and subjects
/// that fail to hydrate during ranking are silently dropped.
#[derive(Debug, Error)]
pub enum VotingError {
    /// The magnitude was outside `0..=5`. Rejected before any store access
    /// and never retried.
    #[error("Invalid vote magnitude: {0}")]
    InvalidMagnitude(i16),

    /// Two calls raced on the same identity key and the retry also lost.
    /// Transient; the caller may retry the request.
    #[error("Concurrent modification of the same vote, retry the request")]
    Conflict,

    #[error("Invalid ranking window: {0}")]
    InvalidWindow(String),

    #[error(transparent)]
    Repository(#[from] VoteRepositoryError),

    #[error(transparent)]
    Hydration(#[from] HydrationError),
}

impl From<InvalidMagnitude> for VotingError {
    fn from(err: InvalidMagnitude) -> Self {
        Self::InvalidMagnitude(err.0)
    }
}
