//! Fixed-rate recurrence: a grid of timestamps anchored at a first start.

use chrono::{DateTime, Local, TimeDelta};

use super::QueryBudget;
use crate::error::SchedulerError;

/// Recurrence whose execution times lie on the fixed grid
/// `anchor + k * every` for non-decreasing integer `k`.
///
/// The occurrence counter `k` only moves forward. When `now` has advanced
/// past several grid points (long idle period, suspended host), the counter
/// jumps to the first point not in the past — the schedule catches up by
/// skipping, it never fires the missed points back-to-back.
///
/// # Example
/// ```
/// use chrono::{Local, TimeDelta, TimeZone};
/// use cadent::FixedRateRecurrence;
///
/// let anchor = Local.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
/// let mut rule = FixedRateRecurrence::new(anchor, TimeDelta::minutes(10), None).unwrap();
///
/// // 35 minutes in: grid points 9:10, 9:20, 9:30 are gone; 9:40 is next.
/// let now = Local.with_ymd_and_hms(2026, 1, 5, 9, 35, 0).unwrap();
/// assert_eq!(
///     rule.next(now).unwrap(),
///     Local.with_ymd_and_hms(2026, 1, 5, 9, 40, 0).unwrap(),
/// );
/// assert_eq!(rule.occurrences(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct FixedRateRecurrence {
    anchor: DateTime<Local>,
    every: TimeDelta,
    /// Current grid point, `anchor + occurrences * every`.
    next_at: DateTime<Local>,
    occurrences: u64,
    budget: QueryBudget,
}

impl FixedRateRecurrence {
    /// Creates a fixed-rate recurrence.
    ///
    /// `limit: None` = unlimited queries. Errors with
    /// [`SchedulerError::NonPositiveInterval`] if `every` is not positive,
    /// which would stall the catch-up walk.
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
            next_at: anchor,
            occurrences: 0,
            budget: QueryBudget::new(limit),
        })
    }

    /// Computes the next grid point at or after `now`, or `None` once the
    /// query budget is spent.
    ///
    /// Returns the anchor itself while the first run is not yet due.
    pub fn next(&mut self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        if !self.budget.consume() {
            return None;
        }
        if self.anchor > now {
            return Some(self.anchor);
        }
        while self.next_at < now {
            self.occurrences += 1;
            self.next_at = self.next_at + self.every;
        }
        Some(self.next_at)
    }

    /// Number of grid intervals elapsed so far (the `k` of the last
    /// returned `anchor + k * every`).
    pub fn occurrences(&self) -> u64 {
        self.occurrences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 5, h, m, s).unwrap()
    }

    #[test]
    fn test_non_positive_interval_rejected() {
        assert!(matches!(
            FixedRateRecurrence::new(at(9, 0, 0), TimeDelta::zero(), None),
            Err(SchedulerError::NonPositiveInterval { .. })
        ));
        assert!(matches!(
            FixedRateRecurrence::new(at(9, 0, 0), TimeDelta::seconds(-5), None),
            Err(SchedulerError::NonPositiveInterval { .. })
        ));
    }

    #[test]
    fn test_future_anchor_returned_as_is() {
        let mut r = FixedRateRecurrence::new(at(12, 0, 0), TimeDelta::minutes(5), None).unwrap();
        assert_eq!(r.next(at(9, 0, 0)).unwrap(), at(12, 0, 0));
        assert_eq!(r.occurrences(), 0);
    }

    #[test]
    fn test_catch_up_skips_missed_grid_points() {
        let mut r = FixedRateRecurrence::new(at(9, 0, 0), TimeDelta::minutes(1), None).unwrap();
        assert_eq!(r.next(at(9, 5, 30)).unwrap(), at(9, 6, 0));
        assert_eq!(r.occurrences(), 6);
    }

    #[test]
    fn test_exact_grid_hit_returned() {
        let mut r = FixedRateRecurrence::new(at(9, 0, 0), TimeDelta::minutes(1), None).unwrap();
        assert_eq!(r.next(at(9, 6, 0)).unwrap(), at(9, 6, 0));
    }

    #[test]
    fn test_returned_times_on_grid_and_non_decreasing() {
        let anchor = at(9, 0, 0);
        let every = TimeDelta::seconds(90);
        let mut r = FixedRateRecurrence::new(anchor, every, None).unwrap();

        let mut prev = anchor;
        let mut prev_k = 0;
        for step in [0i64, 40, 95, 100, 300, 301, 1000] {
            let now = anchor + TimeDelta::seconds(step);
            let next = r.next(now).unwrap();
            let k = r.occurrences();

            assert!(next >= now);
            assert!(next >= prev, "grid went backwards: {next} < {prev}");
            assert!(k >= prev_k, "counter went backwards: {k} < {prev_k}");
            assert_eq!(next, anchor + every * (k as i32));

            prev = next;
            prev_k = k;
        }
    }

    #[test]
    fn test_query_limit_exhausts_permanently() {
        let mut r = FixedRateRecurrence::new(at(9, 0, 0), TimeDelta::minutes(1), Some(2)).unwrap();
        let now = at(9, 0, 30);
        assert!(r.next(now).is_some());
        assert!(r.next(now).is_some());
        assert!(r.next(now).is_none());
        assert!(r.next(now).is_none());
    }
}
