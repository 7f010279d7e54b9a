//! The vote recording state machine.
//!
//! `VoteRecorder` decides whether an incoming vote is a no-op, a fresh vote,
//! a magnitude change or a retraction, and keeps the store converged on at
//! most one row per identity key even when two calls race on the same key.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use voting_repository::{VoteRepository, VoteRepositoryError};
use voting_shared::identity::VoterIdentity;
use voting_shared::types::{Magnitude, SubjectRef, VoteIdentity};

use crate::VotingError;

/// The retract sentinel accepted at this boundary; never stored.
const RETRACT: i16 = 0;

/// Records votes through the repository, one effective vote per identity key.
///
/// Holds no state beyond the repository handle; every decision re-reads the
/// stored rows.
pub struct VoteRecorder {
    repository: Arc<dyn VoteRepository>,
}

impl VoteRecorder {
    pub fn new(repository: Arc<dyn VoteRepository>) -> Self {
        Self { repository }
    }

    /// Records a vote on `subject` by the given identity.
    ///
    /// `magnitude` must be in `0..=5`; zero retracts any existing vote.
    /// Unauthenticated identities vote anonymously, keyed by `address` alone,
    /// regardless of any id the identity value carries.
    ///
    /// # Returns
    ///
    /// `true` when an existing vote was altered or removed; `false` for a
    /// fresh vote or for retracting a vote that never existed. The boolean
    /// does not mean "a vote now exists".
    pub async fn record_vote(
        &self,
        subject: SubjectRef,
        magnitude: i16,
        address: IpAddr,
        identity: &dyn VoterIdentity,
    ) -> Result<bool, VotingError> {
        if !(RETRACT..=5).contains(&magnitude) {
            return Err(VotingError::InvalidMagnitude(magnitude));
        }

        let key = VoteIdentity {
            voter: identity.effective_voter(),
            address,
            subject,
        };

        match self.repository.find_by_identity(&key).await? {
            None if magnitude == RETRACT => {
                debug!(%subject, "retract without existing vote, no-op");
                Ok(false)
            }
            None => {
                let magnitude = Magnitude::new(magnitude)?;
                match self.repository.insert(&key, magnitude, Utc::now()).await {
                    Ok(_) => {
                        debug!(%subject, magnitude = magnitude.value(), "fresh vote");
                        Ok(false)
                    }
                    // A concurrent call created the row between our read and
                    // this insert; the unique index made us the loser. Fall
                    // back to an update, once.
                    Err(VoteRepositoryError::DuplicateVote) => {
                        warn!(%subject, "lost create race, converting to update");
                        if self.repository.update_magnitude(&key, magnitude).await? {
                            Ok(true)
                        } else {
                            Err(VotingError::Conflict)
                        }
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Some(_) if magnitude == RETRACT => {
                self.repository.delete_by_identity(&key).await?;
                debug!(%subject, "vote retracted");
                Ok(true)
            }
            Some(_) => {
                let magnitude = Magnitude::new(magnitude)?;
                if self.repository.update_magnitude(&key, magnitude).await? {
                    debug!(%subject, magnitude = magnitude.value(), "vote changed");
                    Ok(true)
                } else {
                    // The row we just read was deleted under us.
                    Err(VotingError::Conflict)
                }
            }
        }
    }
}
