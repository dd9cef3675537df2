//! Weekly calendar recurrence: fire on a set of weekdays at a time-of-day.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Local, NaiveTime, TimeDelta, Weekday};

use crate::clock::resolve_local;
use crate::error::SchedulerError;

/// Recurrence whose execution times fall on a configured set of weekdays,
/// always at the same time-of-day.
///
/// Unbounded: every query succeeds, and the returned timestamp is always
/// strictly after the `now` it was computed from. Querying on a configured
/// weekday before the time-of-day yields "later today"; otherwise the
/// schedule wraps to the nearest configured weekday, up to one week out.
///
/// # Example
/// ```
/// use std::collections::HashSet;
/// use chrono::{Local, NaiveTime, TimeZone, Weekday};
/// use cadent::DayOfWeekRecurrence;
///
/// let mut rule = DayOfWeekRecurrence::new(
///     HashSet::from([Weekday::Wed]),
///     NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
/// )
/// .unwrap();
///
/// // Wednesday 07:00 — today's 08:00 is still ahead.
/// let now = Local.with_ymd_and_hms(2026, 1, 7, 7, 0, 0).unwrap();
/// let next = rule.next(now).unwrap();
/// assert_eq!(next, Local.with_ymd_and_hms(2026, 1, 7, 8, 0, 0).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct DayOfWeekRecurrence {
    days: HashSet<Weekday>,
    at: NaiveTime,
}

impl DayOfWeekRecurrence {
    /// Creates a weekly recurrence firing on `days` at `at`.
    ///
    /// Errors with [`SchedulerError::EmptyWeekdaySet`] if `days` is empty:
    /// a schedule with no days would never produce an execution time.
    pub fn new(days: HashSet<Weekday>, at: NaiveTime) -> Result<Self, SchedulerError> {
        if days.is_empty() {
            return Err(SchedulerError::EmptyWeekdaySet);
        }
        Ok(Self { days, at })
    }

    /// Creates a weekly recurrence firing on `days` at midnight.
    pub fn at_midnight(days: HashSet<Weekday>) -> Result<Self, SchedulerError> {
        Self::new(days, NaiveTime::MIN)
    }

    /// Computes the next execution time strictly after `now`.
    ///
    /// For each configured weekday the candidate is today's time-of-day
    /// shifted by `(weekday - now.weekday) mod 7` days; the earliest
    /// candidate strictly after `now` wins, defaulting to today's
    /// time-of-day one week out.
    pub fn next(&mut self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let today_at = now.date_naive().and_time(self.at);
        let mut next = today_at + TimeDelta::days(7);

        for &day in &self.days {
            let offset = (day.num_days_from_monday() + 7 - now.weekday().num_days_from_monday()) % 7;
            let candidate = today_at + TimeDelta::days(i64::from(offset));
            if candidate > now.naive_local() && candidate < next {
                next = candidate;
            }
        }

        Some(resolve_local(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rule(days: &[Weekday], h: u32, m: u32) -> DayOfWeekRecurrence {
        DayOfWeekRecurrence::new(
            days.iter().copied().collect(),
            NaiveTime::from_hms_opt(h, m, 0).unwrap(),
        )
        .unwrap()
    }

    // 2026-01-07 is a Wednesday.
    fn jan(day: u32, h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, day, h, m, 0).unwrap()
    }

    #[test]
    fn test_empty_weekday_set_rejected() {
        let err = DayOfWeekRecurrence::new(HashSet::new(), NaiveTime::MIN).unwrap_err();
        assert!(matches!(err, SchedulerError::EmptyWeekdaySet));
    }

    #[test]
    fn test_same_day_before_time_fires_today() {
        let mut r = rule(&[Weekday::Wed], 8, 0);
        let next = r.next(jan(7, 7, 0)).unwrap();
        assert_eq!(next, jan(7, 8, 0));
    }

    #[test]
    fn test_same_day_after_time_wraps_a_week() {
        let mut r = rule(&[Weekday::Wed], 8, 0);
        let next = r.next(jan(7, 9, 0)).unwrap();
        assert_eq!(next, jan(14, 8, 0));
    }

    #[test]
    fn test_monday_rule_queried_on_wednesday() {
        let mut r = rule(&[Weekday::Mon], 9, 0);
        let next = r.next(jan(7, 10, 0)).unwrap();
        assert_eq!(next, jan(12, 9, 0));
        assert_eq!(next.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_exact_hit_is_not_returned() {
        // Result must be strictly after now, so an exact hit wraps.
        let mut r = rule(&[Weekday::Wed], 8, 0);
        let next = r.next(jan(7, 8, 0)).unwrap();
        assert_eq!(next, jan(14, 8, 0));
    }

    #[test]
    fn test_picks_earliest_of_several_days() {
        let mut r = rule(&[Weekday::Mon, Weekday::Thu], 9, 0);
        let next = r.next(jan(7, 10, 0)).unwrap();
        assert_eq!(next, jan(8, 9, 0));
        assert_eq!(next.weekday(), Weekday::Thu);
    }

    #[test]
    fn test_never_exhausts() {
        let mut r = rule(&[Weekday::Sun], 0, 0);
        let now = jan(7, 12, 0);
        for _ in 0..1_000 {
            assert!(r.next(now).is_some());
        }
    }

    #[test]
    fn test_always_strictly_after_now() {
        let mut r = rule(&[Weekday::Mon, Weekday::Wed, Weekday::Fri], 6, 30);
        for day in 1..=28 {
            for hour in [0, 6, 12, 23] {
                let now = jan(day, hour, 15);
                let next = r.next(now).unwrap();
                assert!(next > now, "next {next} not after now {now}");
            }
        }
    }

    #[test]
    fn test_at_midnight() {
        let mut r = DayOfWeekRecurrence::at_midnight(HashSet::from([Weekday::Thu])).unwrap();
        let next = r.next(jan(7, 10, 0)).unwrap();
        assert_eq!(next, jan(8, 0, 0));
    }
}
