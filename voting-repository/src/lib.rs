//! # Voting Repository
//! This crate provides the trait and implementations for the vote store. It
//! includes definitions for errors, interfaces, a concrete PostgreSQL
//! implementation, and an in-memory implementation for tests and local
//! development.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::VoteRepositoryError;
pub use interfaces::VoteRepository;
pub use memory::MemoryVoteRepository;
pub use postgres::{PostgresRepositoryConfig, PostgresVoteRepository};
