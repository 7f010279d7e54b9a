//! # Voting Engine
//! This crate provides the vote tallying and ranking engine on top of the
//! vote repository: the recording state machine, score aggregation, and the
//! top/bottom rank queries with their date-window helpers, composed into a
//! single `VotingService` façade.
pub mod aggregator;
pub mod errors;
pub mod ranking;
pub mod recorder;
pub mod service;
pub mod window;

pub use aggregator::ScoreAggregator;
pub use errors::VotingError;
pub use ranking::{RankQueryEngine, DEFAULT_RANK_LIMIT};
pub use recorder::VoteRecorder;
pub use service::VotingService;
