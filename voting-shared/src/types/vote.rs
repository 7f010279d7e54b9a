use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::IpAddr;

use super::{Magnitude, SubjectRef};

/// Stable identifier of an authenticated voter, supplied by the host's
/// identity provider.
pub type VoterId = i64;

/// The uniqueness key under which at most one vote row may exist.
///
/// `voter` is `None` for anonymous votes. Two anonymous voters behind the
/// same address therefore share a key for a given subject and collide; that
/// is the same-IP throttle, not a defect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoteIdentity {
    pub voter: Option<VoterId>,
    pub address: IpAddr,
    pub subject: SubjectRef,
}

/// A persisted vote on a subject.
///
/// `cast_at` is set once at creation and never updated; changing the
/// magnitude of an existing vote keeps the original timestamp, so
/// date-windowed rankings see the vote in its original window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Vote {
    pub id: i64,
    pub voter: Option<VoterId>,
    pub address: IpAddr,
    pub subject: SubjectRef,
    pub magnitude: Magnitude,
    pub cast_at: DateTime<Utc>,
}

impl Vote {
    pub fn identity(&self) -> VoteIdentity {
        VoteIdentity {
            voter: self.voter,
            address: self.address,
            subject: self.subject,
        }
    }
}
