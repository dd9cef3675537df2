//! # Global scheduler configuration.
//!
//! [`SchedulerConfig`] centralizes the runtime knobs: event bus capacity,
//! the grace period a global stop waits for containers to drain, and the
//! default policy applied when a task run fails.

use std::time::Duration;

/// What a container does when a firing fails.
///
/// The failure itself is always published to the bus as
/// [`FiringFailed`](crate::EventKind::FiringFailed); this policy only
/// decides whether the recurrence survives it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep the recurrence alive: log the failure and schedule the next
    /// firing as usual (default).
    #[default]
    Continue,
    /// End the recurrence: the container terminates after the first
    /// failing run.
    Abort,
}

/// Global configuration for the scheduler.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use cadent::{FailurePolicy, SchedulerConfig};
///
/// let mut cfg = SchedulerConfig::default();
/// cfg.grace = Duration::from_secs(10);
/// cfg.on_failure = FailurePolicy::Abort;
///
/// assert_eq!(cfg.bus_capacity, 1024);
/// ```
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// Maximum time a global stop waits for containers to drain.
    pub grace: Duration,
    /// Default failure policy for recurring containers.
    pub on_failure: FailurePolicy,
}

impl Default for SchedulerConfig {
    /// Provides a default configuration:
    /// - `bus_capacity = 1024`
    /// - `grace = 30s`
    /// - `on_failure = FailurePolicy::Continue`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
            on_failure: FailurePolicy::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.bus_capacity, 1024);
        assert_eq!(cfg.grace, Duration::from_secs(30));
        assert_eq!(cfg.on_failure, FailurePolicy::Continue);
    }
}
