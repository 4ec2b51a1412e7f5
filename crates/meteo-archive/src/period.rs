//! Time periods used to select archive days.

use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::{local_date, resolve_local};

/// A half-open range of instants, `[start, end)`.
///
/// Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimePeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimePeriod {
    /// Create a period from explicit bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Period named by a relative token, evaluated at `now` in `tz`.
    ///
    /// Boundaries fall on local midnight: days start at 00:00, weeks on
    /// Monday, months on the 1st and years on January 1st.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use chrono_tz::Europe::Rome;
    /// use meteo_archive::{RelativePeriod, TimePeriod};
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
    /// let month = TimePeriod::relative(RelativePeriod::ThisMonth, now, Rome);
    /// assert_eq!(month.start(), Utc.with_ymd_and_hms(2024, 4, 30, 22, 0, 0).unwrap());
    /// assert_eq!(month.end(), Utc.with_ymd_and_hms(2024, 5, 31, 22, 0, 0).unwrap());
    /// ```
    pub fn relative(kind: RelativePeriod, now: DateTime<Utc>, tz: Tz) -> Self {
        let today = local_date(tz, now);
        let (from, to) = kind.local_bounds(today);
        let midnight = |date: NaiveDate| resolve_local(tz, date.and_time(NaiveTime::MIN));
        Self {
            start: midnight(from),
            end: midnight(to),
        }
    }

    /// Today in `tz`, from local midnight to the next one.
    pub fn today(tz: Tz) -> Self {
        Self::relative(RelativePeriod::Today, Utc::now(), tz)
    }

    /// Inclusive start.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `at` falls inside the period.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    /// Local dates of the period's daily steps, ascending, as seen in `tz`.
    ///
    /// Steps start at `start` and advance one calendar day at a time, keeping
    /// `start`'s local time of day. A date is emitted for each step that is
    /// still before `end`, so a period from 23:30 to 00:30 the next day yields
    /// only its first date.
    pub fn days(&self, tz: Tz) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let local_start = self.start.with_timezone(&tz);
        let time_of_day = local_start.time();
        let mut date = local_start.date_naive();
        let mut cursor = self.start;

        while cursor < self.end {
            days.push(date);
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
            cursor = resolve_local(tz, date.and_time(time_of_day));
        }
        days
    }
}

/// Named periods relative to the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelativePeriod {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
}

impl RelativePeriod {
    /// Every token, shortest span first.
    pub const ALL: [RelativePeriod; 8] = [
        RelativePeriod::Today,
        RelativePeriod::Yesterday,
        RelativePeriod::ThisWeek,
        RelativePeriod::LastWeek,
        RelativePeriod::ThisMonth,
        RelativePeriod::LastMonth,
        RelativePeriod::ThisYear,
        RelativePeriod::LastYear,
    ];

    /// Token spelling used by [`FromStr`] and [`Display`](fmt::Display).
    pub fn as_str(&self) -> &'static str {
        match self {
            RelativePeriod::Today => "today",
            RelativePeriod::Yesterday => "yesterday",
            RelativePeriod::ThisWeek => "this-week",
            RelativePeriod::LastWeek => "last-week",
            RelativePeriod::ThisMonth => "this-month",
            RelativePeriod::LastMonth => "last-month",
            RelativePeriod::ThisYear => "this-year",
            RelativePeriod::LastYear => "last-year",
        }
    }

    /// Local start and end dates for a period containing `today`.
    fn local_bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let monday = sub_days(today, u64::from(today.weekday().num_days_from_monday()));
        let first_of_month = today.with_day(1).unwrap_or(today);
        let first_of_year = today.with_ordinal(1).unwrap_or(today);

        match self {
            RelativePeriod::Today => (today, add_days(today, 1)),
            RelativePeriod::Yesterday => (sub_days(today, 1), today),
            RelativePeriod::ThisWeek => (monday, add_days(monday, 7)),
            RelativePeriod::LastWeek => (sub_days(monday, 7), monday),
            RelativePeriod::ThisMonth => (first_of_month, add_months(first_of_month, 1)),
            RelativePeriod::LastMonth => (sub_months(first_of_month, 1), first_of_month),
            RelativePeriod::ThisYear => (first_of_year, add_months(first_of_year, 12)),
            RelativePeriod::LastYear => (sub_months(first_of_year, 12), first_of_year),
        }
    }
}

// Calendar arithmetic saturates at chrono's supported range.
fn add_days(date: NaiveDate, n: u64) -> NaiveDate {
    date.checked_add_days(Days::new(n)).unwrap_or(NaiveDate::MAX)
}

fn sub_days(date: NaiveDate, n: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
}

fn add_months(date: NaiveDate, n: u32) -> NaiveDate {
    date.checked_add_months(Months::new(n)).unwrap_or(NaiveDate::MAX)
}

fn sub_months(date: NaiveDate, n: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(n)).unwrap_or(NaiveDate::MIN)
}

impl fmt::Display for RelativePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelativePeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        RelativePeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<_> = RelativePeriod::ALL.iter().map(|p| p.as_str()).collect();
                format!("unknown period '{}' (expected one of: {})", s, valid.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Rome;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_bounds() {
        let result = TimePeriod::new(utc(2024, 1, 2, 0), utc(2024, 1, 1, 0));
        assert!(matches!(result, Err(Error::InvalidPeriod { .. })));
    }

    #[test]
    fn test_new_accepts_empty_period() {
        let at = utc(2024, 1, 1, 0);
        let period = TimePeriod::new(at, at).unwrap();
        assert!(period.days(Rome).is_empty());
        assert!(!period.contains(at));
    }

    #[test]
    fn test_days_excludes_end() {
        let period = TimePeriod::new(utc(2024, 1, 1, 0), utc(2024, 1, 4, 0)).unwrap();
        let expected = vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)];
        assert_eq!(period.days(Tz::UTC), expected);
        assert_eq!(period.days(Rome), expected);
    }

    #[test]
    fn test_days_partial_day_at_end() {
        let period = TimePeriod::new(utc(2024, 1, 1, 12), utc(2024, 1, 2, 13)).unwrap();
        assert_eq!(
            period.days(Tz::UTC),
            vec![date(2024, 1, 1), date(2024, 1, 2)]
        );
    }

    #[test]
    fn test_days_steps_from_start_time_of_day() {
        let period = TimePeriod::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 30, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(period.days(Tz::UTC), vec![date(2024, 1, 1)]);
    }

    #[test]
    fn test_days_uses_local_calendar() {
        // 23:30 UTC on Dec 31 is already Jan 1 in Rome.
        let period = TimePeriod::new(
            Utc.with_ymd_and_hms(2023, 12, 31, 23, 30, 0).unwrap(),
            utc(2024, 1, 1, 23),
        )
        .unwrap();
        assert_eq!(period.days(Rome), vec![date(2024, 1, 1)]);
        assert_eq!(period.days(Tz::UTC), vec![date(2023, 12, 31)]);
    }

    #[test]
    fn test_days_across_dst_change() {
        let month = TimePeriod::relative(RelativePeriod::ThisMonth, utc(2024, 3, 15, 12), Rome);
        let days = month.days(Rome);
        assert_eq!(days.len(), 31);
        assert_eq!(days.first(), Some(&date(2024, 3, 1)));
        assert_eq!(days.last(), Some(&date(2024, 3, 31)));
    }

    #[test]
    fn test_relative_today_and_yesterday() {
        let now = utc(2024, 6, 10, 23); // 01:00 on June 11 in Rome
        let today = TimePeriod::relative(RelativePeriod::Today, now, Rome);
        assert_eq!(today.start(), utc(2024, 6, 10, 22));
        assert_eq!(today.end(), utc(2024, 6, 11, 22));
        assert!(today.contains(now));

        let yesterday = TimePeriod::relative(RelativePeriod::Yesterday, now, Rome);
        assert_eq!(yesterday.end(), today.start());
        assert_eq!(yesterday.days(Rome), vec![date(2024, 6, 10)]);
    }

    #[test]
    fn test_relative_weeks_start_on_monday() {
        let now = utc(2024, 5, 16, 12); // Thursday
        let this_week = TimePeriod::relative(RelativePeriod::ThisWeek, now, Tz::UTC);
        assert_eq!(this_week.start(), utc(2024, 5, 13, 0));
        assert_eq!(this_week.end(), utc(2024, 5, 20, 0));

        let last_week = TimePeriod::relative(RelativePeriod::LastWeek, now, Tz::UTC);
        assert_eq!(last_week.start(), utc(2024, 5, 6, 0));
        assert_eq!(last_week.end(), this_week.start());
    }

    #[test]
    fn test_relative_week_on_monday_itself() {
        let now = utc(2024, 5, 13, 0);
        let this_week = TimePeriod::relative(RelativePeriod::ThisWeek, now, Tz::UTC);
        assert_eq!(this_week.start(), now);
    }

    #[test]
    fn test_relative_months_wrap_year() {
        let now = utc(2024, 1, 20, 12);
        let last_month = TimePeriod::relative(RelativePeriod::LastMonth, now, Tz::UTC);
        assert_eq!(last_month.start(), utc(2023, 12, 1, 0));
        assert_eq!(last_month.end(), utc(2024, 1, 1, 0));
        assert_eq!(last_month.days(Tz::UTC).len(), 31);
    }

    #[test]
    fn test_relative_years() {
        let now = utc(2024, 8, 1, 12);
        let this_year = TimePeriod::relative(RelativePeriod::ThisYear, now, Tz::UTC);
        assert_eq!(this_year.days(Tz::UTC).len(), 366);

        let last_year = TimePeriod::relative(RelativePeriod::LastYear, now, Tz::UTC);
        assert_eq!(last_year.start(), utc(2023, 1, 1, 0));
        assert_eq!(last_year.end(), this_year.start());
    }

    #[test]
    fn test_relative_does_not_depend_on_earlier_instances() {
        let now = utc(2024, 8, 1, 12);
        let first = TimePeriod::relative(RelativePeriod::ThisWeek, now, Rome);
        let _ = TimePeriod::relative(RelativePeriod::LastYear, now, Rome);
        let second = TimePeriod::relative(RelativePeriod::ThisWeek, now, Rome);
        assert_eq!(first, second);
    }

    #[test]
    fn test_relative_period_parse() {
        assert_eq!("this-week".parse(), Ok(RelativePeriod::ThisWeek));
        assert_eq!("LAST_MONTH".parse(), Ok(RelativePeriod::LastMonth));
        assert!("fortnight".parse::<RelativePeriod>().is_err());
        for kind in RelativePeriod::ALL {
            assert_eq!(kind.to_string().parse(), Ok(kind));
        }
    }
}
