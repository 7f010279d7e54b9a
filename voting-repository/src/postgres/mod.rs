//! PostgreSQL implementation of the vote repository.
mod config;
mod vote_repository;

pub use config::PostgresRepositoryConfig;
pub use vote_repository::PostgresVoteRepository;
