//! # Runtime events emitted by containers and the scheduler.
//!
//! [`EventKind`] classifies the firing lifecycle (scheduled, started,
//! completed, failed), terminal conditions (recurrence exhausted, container
//! terminated) and shutdown. [`Event`] carries the metadata: timestamps,
//! task name, firing counter, delays, failure reasons.
//!
//! ## Ordering
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore publish order when events are
//! observed out of order.
//!
//! ## Example
//! ```
//! use std::time::Duration;
//! use cadent::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::FiringFailed)
//!     .with_task("nightly-report")
//!     .with_firing(3)
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::FiringFailed);
//! assert_eq!(ev.task.as_deref(), Some("nightly-report"));
//! assert_eq!(ev.firing, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Firing lifecycle ===
    /// The worker armed its single-shot timer for the next firing.
    ///
    /// Sets: `task`, `delay`.
    FiringScheduled,

    /// A firing began executing its task.
    ///
    /// Sets: `task`, `firing` (1-based, per container).
    FiringStarted,

    /// A firing finished successfully.
    ///
    /// Sets: `task`, `firing`.
    FiringCompleted,

    /// A firing failed; the container's failure policy decides what happens.
    ///
    /// Sets: `task`, `firing`, `reason`.
    FiringFailed,

    // === Terminal conditions ===
    /// The recurrence used up its query budget; the container ends its
    /// cycle cleanly (implicit shutdown, not an error).
    ///
    /// Sets: `task`.
    RecurrenceExhausted,

    /// The container's worker exited; the container is permanently done.
    ///
    /// Sets: `task`.
    ContainerTerminated,

    // === One-off lane ===
    /// A one-off task was accepted and armed.
    ///
    /// Sets: `task`, `delay`.
    OneShotScheduled,

    // === Shutdown ===
    /// A shutdown was requested, for one container (`task` set) or
    /// globally (`task` unset).
    ///
    /// Sets: `task` (optional), `reason` (`"forced"` for `shutdown_now`).
    ShutdownRequested,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (failure messages, shutdown mode).
    pub reason: Option<Arc<str>>,
    /// Whole-second delay until the armed firing.
    pub delay: Option<Duration>,
    /// Firing count (starting from 1, per container).
    pub firing: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            delay: None,
            firing: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the delay until the armed firing.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Attaches a firing count.
    #[inline]
    pub fn with_firing(mut self, firing: u64) -> Self {
        self.firing = Some(firing);
        self
    }

    /// True for events that end a container's life.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::RecurrenceExhausted | EventKind::ContainerTerminated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_metadata() {
        let ev = Event::new(EventKind::FiringScheduled)
            .with_task("t")
            .with_delay(Duration::from_secs(60))
            .with_firing(2)
            .with_reason("r");
        assert_eq!(ev.task.as_deref(), Some("t"));
        assert_eq!(ev.delay, Some(Duration::from_secs(60)));
        assert_eq!(ev.firing, Some(2));
        assert_eq!(ev.reason.as_deref(), Some("r"));
    }

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::FiringStarted);
        let b = Event::new(EventKind::FiringStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(Event::new(EventKind::RecurrenceExhausted).is_terminal());
        assert!(Event::new(EventKind::ContainerTerminated).is_terminal());
        assert!(!Event::new(EventKind::FiringCompleted).is_terminal());
    }
}
