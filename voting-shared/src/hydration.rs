//! The seam through which ranked subject ids are resolved back to live
//! application entities, one batch per query.

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{SubjectId, SubjectType};

/// The hydrator's backing store failed; distinct from an id simply not
/// resolving, which is reported by absence from the batch result.
#[derive(Debug, Error)]
#[error("subject hydration failed: {0}")]
pub struct HydrationError(pub String);

impl HydrationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Batch loader for one subject type, registered by the host application.
///
/// `load_batch` must resolve all the ids it can in a single lookup; ids that
/// no longer resolve to a live entity (deleted after being voted on) are left
/// out of the returned map and the ranking layer silently drops them.
#[async_trait::async_trait]
pub trait SubjectHydrator: Send + Sync {
    type Subject: Send;

    /// The tag under which this hydrator's entities are voted on.
    fn subject_type(&self) -> SubjectType;

    async fn load_batch(
        &self,
        ids: &[SubjectId],
    ) -> Result<HashMap<SubjectId, Self::Subject>, HydrationError>;
}
