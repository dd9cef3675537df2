//! Wall-clock helpers: time flooring, delay conversion, local-time resolution.
//!
//! The scheduler works with second precision: user-supplied start times are
//! floored before delay computation, and delays handed to the timer are whole
//! seconds, truncated and never negative. Because everything is derived from
//! the system's local clock, schedules follow clock changes, DST shifts, and
//! leap-second smearing.

use std::time::Duration;

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Timelike};

/// Coarsest time-of-day component to preserve when flooring a timestamp.
///
/// Components finer than the chosen unit are zeroed; sub-second components
/// are always zeroed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloorUnit {
    /// Keep the hour, zero minutes and seconds.
    Hour,
    /// Keep hour and minute, zero seconds.
    Minute,
    /// Keep hour, minute and second.
    Second,
}

/// Floors a timestamp down to the given unit.
///
/// Used to normalize user-supplied start times before delay computation.
///
/// # Example
/// ```
/// use chrono::{Local, TimeZone, Timelike};
/// use cadent::{floor_date_time, FloorUnit};
///
/// let t = Local.with_ymd_and_hms(2026, 3, 9, 14, 37, 52).unwrap();
/// let floored = floor_date_time(t, FloorUnit::Minute);
/// assert_eq!(floored.minute(), 37);
/// assert_eq!(floored.second(), 0);
/// ```
pub fn floor_date_time(time: DateTime<Local>, unit: FloorUnit) -> DateTime<Local> {
    let t = time.time();
    let (hour, min, sec) = match unit {
        FloorUnit::Hour => (t.hour(), 0, 0),
        FloorUnit::Minute => (t.hour(), t.minute(), 0),
        FloorUnit::Second => (t.hour(), t.minute(), t.second()),
    };
    match time.date_naive().and_hms_opt(hour, min, sec) {
        Some(ndt) => resolve_local(ndt),
        None => time,
    }
}

/// Converts the gap between `next` and `now` into a whole-second delay.
///
/// Fractional seconds are truncated; a `next` at or before `now` yields zero
/// (fire immediately).
pub fn seconds_until(next: DateTime<Local>, now: DateTime<Local>) -> Duration {
    let secs = (next - now).num_seconds().max(0);
    Duration::from_secs(secs as u64)
}

/// Resolves a naive local datetime to an instant.
///
/// Ambiguous times (clock set back) resolve to the earlier instant. Times
/// that do not exist (clock set forward) resolve to the earliest valid
/// instant at or after the gap, probed in 15-minute steps.
pub(crate) fn resolve_local(ndt: NaiveDateTime) -> DateTime<Local> {
    let mut probe = ndt;
    for _ in 0..12 {
        match Local.from_local_datetime(&probe) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earlier, _) => return earlier,
            LocalResult::None => probe = probe + TimeDelta::minutes(15),
        }
    }
    // No real timezone has a gap this wide; reinterpret as UTC rather than fail.
    Local.from_utc_datetime(&ndt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 9, h, m, s).unwrap()
    }

    #[test]
    fn test_floor_to_minute_zeroes_seconds() {
        let floored = floor_date_time(at(14, 37, 52), FloorUnit::Minute);
        assert_eq!(floored.hour(), 14);
        assert_eq!(floored.minute(), 37);
        assert_eq!(floored.second(), 0);
        assert_eq!(floored.nanosecond(), 0);
    }

    #[test]
    fn test_floor_to_hour_zeroes_minutes_and_seconds() {
        let floored = floor_date_time(at(14, 37, 52), FloorUnit::Hour);
        assert_eq!(floored.hour(), 14);
        assert_eq!(floored.minute(), 0);
        assert_eq!(floored.second(), 0);
    }

    #[test]
    fn test_floor_to_second_only_drops_subseconds() {
        let t = at(14, 37, 52) + TimeDelta::milliseconds(250);
        let floored = floor_date_time(t, FloorUnit::Second);
        assert_eq!(floored.second(), 52);
        assert_eq!(floored.nanosecond(), 0);
    }

    #[test]
    fn test_seconds_until_truncates() {
        let now = at(10, 0, 0);
        let next = now + TimeDelta::milliseconds(1500);
        assert_eq!(seconds_until(next, now), Duration::from_secs(1));
    }

    #[test]
    fn test_seconds_until_never_negative() {
        let now = at(10, 0, 0);
        let next = now - TimeDelta::seconds(30);
        assert_eq!(seconds_until(next, now), Duration::ZERO);
    }

    #[test]
    fn test_seconds_until_whole() {
        let now = at(10, 0, 0);
        assert_eq!(
            seconds_until(now + TimeDelta::days(6), now),
            Duration::from_secs(6 * 24 * 3600)
        );
    }
}
