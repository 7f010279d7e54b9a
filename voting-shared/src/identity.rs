//! The seam through which the host's identity/session system reports who is
//! voting. The engine only needs an authenticated-or-not flag and a stable id.

use crate::types::VoterId;

/// A voter as reported by the host's identity provider.
///
/// When `is_authenticated` returns `false` the engine treats the vote as
/// anonymous and ignores whatever `voter_id` returns; the id is only read for
/// authenticated identities.
pub trait VoterIdentity: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// Stable identifier for this voter. Only meaningful when
    /// [`VoterIdentity::is_authenticated`] is `true`.
    fn voter_id(&self) -> VoterId;

    /// The effective identity used for vote rows: `Some(id)` for
    /// authenticated voters, `None` for everyone else.
    fn effective_voter(&self) -> Option<VoterId> {
        self.is_authenticated().then(|| self.voter_id())
    }
}

/// An unauthenticated voter. Votes recorded under this identity are keyed by
/// network address alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct Anonymous;

impl VoterIdentity for Anonymous {
    fn is_authenticated(&self) -> bool {
        false
    }

    fn voter_id(&self) -> VoterId {
        0
    }
}
