//! Recurrence strategies: rules that answer "when does this task run next?"
//!
//! A recurrence is a timestamp provider. Given the current wall-clock time it
//! yields the next time a task should run, or signals exhaustion. The three
//! strategies are a closed set, dispatched exhaustively through the
//! [`Recurrence`] enum:
//!
//! - [`DayOfWeekRecurrence`] — fire on a set of weekdays at a fixed
//!   time-of-day, forever.
//! - [`FixedRateRecurrence`] — fire on a fixed grid of timestamps anchored at
//!   a first start; missed grid points are skipped, never burst.
//! - [`FixedDelayRecurrence`] — fire a fixed interval after the moment the
//!   rule is queried; drifts with run duration.
//!
//! ## Contract
//! - `now` is always an explicit parameter. The math never reads an ambient
//!   clock, so every property is testable without waiting on real time.
//! - [`Recurrence::next`] returns `None` once a bounded rule has used up its
//!   query budget. Exhaustion is permanent: a rule never un-exhausts.
//! - The query counter increments exactly once per successful (`Some`) query.
//!
//! ## Example
//! ```
//! use chrono::{Local, TimeDelta, TimeZone};
//! use cadent::Recurrence;
//!
//! let anchor = Local.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
//! let mut rule = Recurrence::fixed_rate(anchor, TimeDelta::hours(1), Some(2)).unwrap();
//!
//! let now = Local.with_ymd_and_hms(2026, 1, 5, 10, 30, 0).unwrap();
//! let next = rule.next(now).unwrap();
//! assert_eq!(next, Local.with_ymd_and_hms(2026, 1, 5, 11, 0, 0).unwrap());
//!
//! rule.next(now).unwrap();
//! assert!(rule.next(now).is_none()); // budget of 2 spent, exhausted for good
//! ```

mod day_of_week;
mod fixed_delay;
mod fixed_rate;

use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveTime, TimeDelta, Weekday};

pub use day_of_week::DayOfWeekRecurrence;
pub use fixed_delay::FixedDelayRecurrence;
pub use fixed_rate::FixedRateRecurrence;

use crate::error::SchedulerError;

/// Closed set of recurrence strategies.
///
/// Each variant carries its own immutable configuration (anchor, interval,
/// optional query limit) and mutable counters. The only operation is
/// [`next`](Recurrence::next).
#[derive(Clone, Debug)]
pub enum Recurrence {
    /// Weekly calendar schedule.
    DayOfWeek(DayOfWeekRecurrence),
    /// Fixed grid of timestamps from an anchor.
    FixedRate(FixedRateRecurrence),
    /// Fixed interval from the query moment.
    FixedDelay(FixedDelayRecurrence),
}

impl Recurrence {
    /// Builds a [`DayOfWeekRecurrence`] firing on `days` at `at`.
    ///
    /// Errors with [`SchedulerError::EmptyWeekdaySet`] if `days` is empty.
    pub fn day_of_week(days: HashSet<Weekday>, at: NaiveTime) -> Result<Self, SchedulerError> {
        Ok(Recurrence::DayOfWeek(DayOfWeekRecurrence::new(days, at)?))
    }

    /// Builds a [`FixedRateRecurrence`] anchored at `anchor`, firing every
    /// `every`, with an optional query limit (`None` = unlimited).
    ///
    /// Errors with [`SchedulerError::NonPositiveInterval`] if `every` is not
    /// positive.
    pub fn fixed_rate(
        anchor: DateTime<Local>,
        every: TimeDelta,
        limit: Option<u64>,
    ) -> Result<Self, SchedulerError> {
        Ok(Recurrence::FixedRate(FixedRateRecurrence::new(
            anchor, every, limit,
        )?))
    }

    /// Builds a [`FixedDelayRecurrence`] anchored at `anchor`, firing `every`
    /// after each query, with an optional query limit (`None` = unlimited).
    ///
    /// Errors with [`SchedulerError::NonPositiveInterval`] if `every` is not
    /// positive.
    pub fn fixed_delay(
        anchor: DateTime<Local>,
        every: TimeDelta,
        limit: Option<u64>,
    ) -> Result<Self, SchedulerError> {
        Ok(Recurrence::FixedDelay(FixedDelayRecurrence::new(
            anchor, every, limit,
        )?))
    }

    /// Computes the next execution time from `now`, or `None` once the
    /// rule is exhausted.
    pub fn next(&mut self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        match self {
            Recurrence::DayOfWeek(r) => r.next(now),
            Recurrence::FixedRate(r) => r.next(now),
            Recurrence::FixedDelay(r) => r.next(now),
        }
    }
}

/// Query budget shared by the bounded strategies.
///
/// `limit: None` means unlimited. Once `used` reaches the limit every
/// further `consume` refuses, so exhaustion is permanent.
#[derive(Clone, Copy, Debug)]
pub(crate) struct QueryBudget {
    limit: Option<u64>,
    used: u64,
}

impl QueryBudget {
    pub(crate) fn new(limit: Option<u64>) -> Self {
        Self { limit, used: 0 }
    }

    /// Spends one query. Returns `false` once the limit is reached.
    pub(crate) fn consume(&mut self) -> bool {
        match self.limit {
            Some(limit) if self.used >= limit => false,
            _ => {
                self.used += 1;
                true
            }
        }
    }
}
