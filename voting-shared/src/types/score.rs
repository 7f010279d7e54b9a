use serde::{Deserialize, Serialize};

/// Raw grouped aggregate over a subject's vote rows as the store reports it.
///
/// `sum` is `None` when no rows matched; the distinction between "no votes"
/// and "votes summing to zero" is carried through to [`SubjectScore`] via
/// `count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubjectAggregate {
    pub sum: Option<i64>,
    pub count: i64,
}

impl SubjectAggregate {
    pub const EMPTY: Self = Self { sum: None, count: 0 };
}

/// Score summary for one subject.
///
/// `score` is the arithmetic mean of magnitudes when `num_votes > 0` and
/// exactly `0.0` otherwise, never `NaN`. An unvoted subject and a subject
/// whose votes average to zero are indistinguishable in `score` alone;
/// callers needing the distinction must inspect `num_votes`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub score: f64,
    pub num_votes: i64,
}

impl SubjectScore {
    pub const UNVOTED: Self = Self {
        score: 0.0,
        num_votes: 0,
    };
}

impl From<SubjectAggregate> for SubjectScore {
    fn from(aggregate: SubjectAggregate) -> Self {
        match (aggregate.sum, aggregate.count) {
            (Some(sum), count) if count > 0 => Self {
                score: sum as f64 / count as f64,
                num_votes: count,
            },
            _ => Self::UNVOTED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_aggregate_scores_zero() {
        assert_eq!(SubjectScore::from(SubjectAggregate::EMPTY), SubjectScore::UNVOTED);
    }

    #[test]
    fn mean_of_magnitudes() {
        let score = SubjectScore::from(SubjectAggregate {
            sum: Some(15),
            count: 5,
        });
        assert_eq!(score.score, 3.0);
        assert_eq!(score.num_votes, 5);
    }

    #[test]
    fn fractional_mean_is_not_truncated() {
        let score = SubjectScore::from(SubjectAggregate {
            sum: Some(10),
            count: 4,
        });
        assert_eq!(score.score, 2.5);
    }
}
