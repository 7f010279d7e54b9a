//! Error types for the vote repository.
//! Defines the errors that can occur during store operations on vote rows.
use thiserror::Error;

/// Represents errors that can occur within the vote repository.
///
/// Store connectivity failures surface through `Database` unmodified; the
/// uniqueness invariant surfacing under a racing insert is reported as
/// `DuplicateVote` so the recorder can convert it to an update.
#[derive(Debug, Error)]
pub enum VoteRepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row for this identity key already exists.
    #[error("A vote already exists for this voter, address and subject")]
    DuplicateVote,

    #[error("Invalid stored address: {0}")]
    InvalidAddress(String),

    #[error("Invalid stored magnitude: {0}")]
    InvalidMagnitude(i16),
}
