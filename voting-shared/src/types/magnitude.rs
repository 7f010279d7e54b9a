use serde::Serialize;
use thiserror::Error;

/// The magnitude was outside the valid `1..=5` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid vote magnitude: {0}")]
pub struct InvalidMagnitude(pub i16);

/// Strength of a stored vote, always in `1..=5`.
///
/// Zero is never a `Magnitude`: at the recording boundary it is the sentinel
/// meaning "retract my vote" and results in a row deletion, not a stored
/// value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Magnitude(i16);

impl Magnitude {
    pub fn new(value: i16) -> Result<Self, InvalidMagnitude> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidMagnitude(value))
        }
    }

    pub fn value(&self) -> i16 {
        self.0
    }
}
