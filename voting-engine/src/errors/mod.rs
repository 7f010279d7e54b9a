//! Error types for the voting engine.
mod voting;

pub use voting::VotingError;
