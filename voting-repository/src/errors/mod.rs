//! Error types for the vote repository.
mod vote_repository;

pub use vote_repository::VoteRepositoryError;
