//! Fixed-delay recurrence: a fixed interval after the query moment.

use chrono::{DateTime, Local, TimeDelta};

use super::QueryBudget;
use crate::error::SchedulerError;

/// Recurrence whose next execution time is a fixed interval after the
/// moment the rule is queried.
///
/// Before the anchor is due the anchor itself is returned; afterwards every
/// query answers `now + every`. Because the container queries the rule after
/// each run completes, the real gap between firings is the interval plus
/// however long the previous run took — repeated slow runs drift the
/// schedule rightward permanently. That is the point of this strategy:
/// "delay after completion", not "delay after anchor".
///
/// # Example
/// ```
/// use chrono::{Local, TimeDelta, TimeZone};
/// use cadent::FixedDelayRecurrence;
///
/// let anchor = Local.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
/// let mut rule = FixedDelayRecurrence::new(anchor, TimeDelta::minutes(30), None).unwrap();
///
/// let now = Local.with_ymd_and_hms(2026, 1, 5, 11, 17, 0).unwrap();
/// assert_eq!(
///     rule.next(now).unwrap(),
///     Local.with_ymd_and_hms(2026, 1, 5, 11, 47, 0).unwrap(),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct FixedDelayRecurrence {
    anchor: DateTime<Local>,
    every: TimeDelta,
    budget: QueryBudget,
}

impl FixedDelayRecurrence {
    /// Creates a fixed-delay recurrence.
    ///
    /// `limit: None` = unlimited queries. Errors with
    /// [`SchedulerError::NonPositiveInterval`] if `every` is not positive.
    pub fn new(
        anchor: DateTime<Local>,
        every: TimeDelta,
        limit: Option<u64>,
    ) -> Result<Self, SchedulerError> {
        if every <= TimeDelta::zero() {
            return Err(SchedulerError::NonPositiveInterval { every });
        }
        Ok(Self {
            anchor,
            every,
            budget: QueryBudget::new(limit),
        })
    }

    /// Returns `max(anchor, now + every)`, or `None` once the query budget
    /// is spent.
    pub fn next(&mut self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        if !self.budget.consume() {
            return None;
        }
        if self.anchor > now {
            Some(self.anchor)
        } else {
            Some(now + self.every)
        }
    }
}
