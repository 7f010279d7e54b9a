use chrono::{DateTime, Utc};

/// Which end of the average-vote ordering a rank query asks for.
///
/// `Top` selects groups whose average is strictly positive and orders them
/// descending; `Bottom` is the mirror: strictly negative averages, ascending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankDirection {
    Top,
    Bottom,
}

/// Inclusive `cast_at` window restricting which votes a rank query sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Parameters of a grouped rank query against the vote store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankQuery {
    pub direction: RankDirection,
    pub limit: i64,
    pub window: Option<RankWindow>,
}

impl RankQuery {
    pub fn new(direction: RankDirection, limit: i64, window: Option<RankWindow>) -> Self {
        Self {
            direction,
            limit,
            window,
        }
    }
}
