//! Error types used by the scheduler and by task executions.
//!
//! This module defines two main error enums:
//!
//! - [`SchedulerError`] — construction and control-flow errors raised by the
//!   scheduling layer itself (invalid recurrence configuration, past start
//!   times, misused lifecycle calls).
//! - [`TaskError`] — errors raised by individual task executions.
//!
//! Recurrence exhaustion is deliberately **not** an error: a bounded
//! recurrence running out of permitted queries ends its cycle cleanly and is
//! reported through the event bus. Likewise, a timeout on
//! [`RecurringTask::await_termination`](crate::RecurringTask::await_termination)
//! is a boolean outcome, not an error.
//!
//! Both types provide `as_label` helpers for logging/metrics.

use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use thiserror::Error;

/// # Errors produced by the scheduling layer.
///
/// These are caller-visible and propagate synchronously: invalid
/// configuration is rejected at construction instead of degrading at
/// fire time.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// A one-off task was registered with a start time that already passed.
    #[error("start time {start_at} is in the past (now {now})")]
    PastStartTime {
        /// The rejected start time.
        start_at: DateTime<Local>,
        /// The clock reading the start time was validated against.
        now: DateTime<Local>,
    },

    /// A day-of-week recurrence was built with no weekdays to fire on.
    #[error("day-of-week recurrence requires at least one weekday")]
    EmptyWeekdaySet,

    /// A fixed-rate or fixed-delay recurrence was built with a zero or
    /// negative interval.
    #[error("recurrence interval must be positive, got {every}")]
    NonPositiveInterval {
        /// The rejected interval.
        every: TimeDelta,
    },

    /// `await_termination` was called on a container that was never asked
    /// to shut down.
    #[error("await_termination called before shutdown on task {task:?}")]
    NotShutDown {
        /// Name of the container the call was made on.
        task: String,
    },

    /// A global stop exceeded its grace period; some containers were still
    /// draining when the wait gave up.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of containers that did not drain in time.
        stuck: Vec<String>,
    },

    /// OS signal listener registration failed.
    #[error("signal listener registration failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::PastStartTime { .. } => "past_start_time",
            SchedulerError::EmptyWeekdaySet => "empty_weekday_set",
            SchedulerError::NonPositiveInterval { .. } => "non_positive_interval",
            SchedulerError::NotShutDown { .. } => "not_shut_down",
            SchedulerError::GraceExceeded { .. } => "grace_exceeded",
            SchedulerError::Signal(_) => "signal",
        }
    }
}

/// # Errors produced by task execution.
///
/// A failing run never terminates the owning worker on its own; the
/// container applies its [`FailurePolicy`](crate::FailurePolicy) and the
/// failure is surfaced on the event bus. [`TaskError::Canceled`] is the
/// designed interruption signal for forced shutdown and is never reported
/// as an application failure.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task was interrupted by a forced shutdown.
    #[error("execution interrupted by shutdown")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`] from any message-like value.
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(SchedulerError::EmptyWeekdaySet.as_label(), "empty_weekday_set");
        assert_eq!(
            SchedulerError::NotShutDown { task: "t".into() }.as_label(),
            "not_shut_down"
        );
        assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    }

    #[test]
    fn test_fail_helper_keeps_message() {
        let err = TaskError::fail("connection refused");
        assert_eq!(err.to_string(), "execution failed: connection refused");
    }
}
