//! # Voting Shared
//! This crate defines the data structures and seams shared across the voting
//! engine: subjects, votes, magnitudes, aggregates, and the traits through
//! which the host application supplies voter identity and subject hydration.
pub mod hydration;
pub mod identity;
pub mod types;
