//! Date-window arithmetic for the week/month ranking helpers.
//!
//! The month window is a fixed 30-day span, not a true calendar month, and
//! the week window runs Monday midnight to the following Sunday midnight.
//! Both widths are kept as-is; consumers depend on them.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use voting_shared::types::RankWindow;

use crate::VotingError;

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Window covering the given ISO week: the Monday that starts it through six
/// days later, both at midnight. Defaults to the current ISO week and year.
pub fn iso_week_window(
    week: Option<u32>,
    year: Option<i32>,
    now: DateTime<Utc>,
) -> Result<RankWindow, VotingError> {
    let week = week.unwrap_or_else(|| now.iso_week().week());
    let year = year.unwrap_or_else(|| now.year());

    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| VotingError::InvalidWindow(format!("year {year} out of range")))?;

    // ISO week 1 is the week containing the first Thursday of the year: when
    // Jan 1 falls Fri-Sun it belongs to the previous year's last week, so
    // week 1 starts the following Monday; otherwise the preceding Monday.
    let days_past_monday = i64::from(jan_first.weekday().num_days_from_monday());
    let week_one_monday = if days_past_monday > 3 {
        jan_first + Duration::days(7 - days_past_monday)
    } else {
        jan_first - Duration::days(days_past_monday)
    };

    let start = week_one_monday + Duration::days((i64::from(week) - 1) * 7);
    Ok(RankWindow {
        from: midnight(start),
        to: midnight(start + Duration::days(6)),
    })
}

/// Thirty-day window for a month: the trailing 30 days when no month is
/// given, otherwise the first of the month plus 30 days.
pub fn month_window(
    month: Option<u32>,
    year: Option<i32>,
    now: DateTime<Utc>,
) -> Result<RankWindow, VotingError> {
    let thirty_days = Duration::days(30);

    match month {
        None => Ok(RankWindow {
            from: now - thirty_days,
            to: now,
        }),
        Some(month) => {
            let year = year.unwrap_or_else(|| now.year());
            let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                VotingError::InvalidWindow(format!("invalid month {month} of year {year}"))
            })?;
            let from = midnight(first);
            Ok(RankWindow {
                from,
                to: from + thirty_days,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn week_one_starts_previous_december_when_jan_first_is_thursday() {
        // Jan 1 2009 was a Thursday; ISO week 1 starts Mon Dec 29 2008.
        let window = iso_week_window(Some(1), Some(2009), at(2009, 6, 1)).unwrap();
        assert_eq!(window.from, midnight(NaiveDate::from_ymd_opt(2008, 12, 29).unwrap()));
        assert_eq!(window.to, midnight(NaiveDate::from_ymd_opt(2009, 1, 4).unwrap()));
    }

    #[test]
    fn week_one_starts_in_january_when_jan_first_is_friday() {
        // Jan 1 2010 was a Friday; ISO week 1 starts Mon Jan 4 2010.
        let window = iso_week_window(Some(1), Some(2010), at(2010, 6, 1)).unwrap();
        assert_eq!(window.from, midnight(NaiveDate::from_ymd_opt(2010, 1, 4).unwrap()));
    }

    #[test]
    fn later_weeks_advance_in_seven_day_steps() {
        let week_one = iso_week_window(Some(1), Some(2010), at(2010, 6, 1)).unwrap();
        let week_three = iso_week_window(Some(3), Some(2010), at(2010, 6, 1)).unwrap();
        assert_eq!(week_three.from - week_one.from, Duration::days(14));
        assert_eq!(week_three.to - week_three.from, Duration::days(6));
    }

    #[test]
    fn week_defaults_to_the_current_iso_week() {
        let now = at(2010, 1, 6); // Wednesday of ISO week 1
        let defaulted = iso_week_window(None, None, now).unwrap();
        let explicit = iso_week_window(Some(1), Some(2010), now).unwrap();
        assert_eq!(defaulted, explicit);
    }

    #[test]
    fn month_without_argument_is_the_trailing_thirty_days() {
        let now = at(2010, 6, 15);
        let window = month_window(None, None, now).unwrap();
        assert_eq!(window.to, now);
        assert_eq!(window.to - window.from, Duration::days(30));
    }

    #[test]
    fn explicit_month_spans_thirty_days_from_its_first() {
        let window = month_window(Some(2), Some(2010), at(2010, 6, 15)).unwrap();
        assert_eq!(window.from, midnight(NaiveDate::from_ymd_opt(2010, 2, 1).unwrap()));
        // Deliberately 30 days, not the real month length.
        assert_eq!(window.to, midnight(NaiveDate::from_ymd_opt(2010, 3, 3).unwrap()));
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        let err = month_window(Some(13), Some(2010), at(2010, 6, 15)).unwrap_err();
        assert!(matches!(err, VotingError::InvalidWindow(_)));
    }
}
