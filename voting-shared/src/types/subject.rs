use serde::Serialize;
use std::fmt;

/// Identifier of a subject within its type, matching the host application's
/// primary key for the underlying entity.
pub type SubjectId = i64;

/// Opaque tag naming a votable entity type.
///
/// The engine never inspects the tag beyond equality and grouping; it is the
/// key under which vote rows for one entity type are stored and aggregated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SubjectType(pub &'static str);

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Polymorphic reference to the entity being voted on.
///
/// A `(subject_type, subject_id)` pair is all the engine ever knows about a
/// subject; resolving it back to a live entity is the host's job via
/// [`crate::hydration::SubjectHydrator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SubjectRef {
    pub subject_type: SubjectType,
    pub subject_id: SubjectId,
}

impl SubjectRef {
    pub fn new(subject_type: SubjectType, subject_id: SubjectId) -> Self {
        Self {
            subject_type,
            subject_id,
        }
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject_type, self.subject_id)
    }
}
