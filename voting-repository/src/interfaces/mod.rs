//! This module defines and re-exports the interface for the vote repository.
mod vote_repository;

pub use vote_repository::VoteRepository;
