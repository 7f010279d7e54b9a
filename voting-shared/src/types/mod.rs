mod magnitude;
mod rank;
mod score;
mod subject;
mod vote;

pub use magnitude::{InvalidMagnitude, Magnitude};
pub use rank::{RankDirection, RankQuery, RankWindow};
pub use score::{SubjectAggregate, SubjectScore};
pub use subject::{SubjectId, SubjectRef, SubjectType};
pub use vote::{Vote, VoteIdentity, VoterId};
