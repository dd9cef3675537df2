//! # Event subscriber trait.
//!
//! [`Subscriber`] is the extension point for plugging observers (logging,
//! metrics, alerting) into the scheduler. The scheduler runs one listener
//! task that receives every bus event and awaits each subscriber in turn,
//! so handlers should stay cheap; offload slow work to their own tasks.

use async_trait::async_trait;

use crate::events::Event;

/// # Observer of runtime events.
///
/// Implementations receive every event published on the scheduler's bus,
/// in `seq` order.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use cadent::{Event, EventKind, Subscriber};
///
/// struct FailureCounter;
///
/// #[async_trait]
/// impl Subscriber for FailureCounter {
///     async fn on_event(&self, event: &Event) {
///         if event.kind == EventKind::FiringFailed {
///             // bump a metric...
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    /// Handles one runtime event.
    async fn on_event(&self, event: &Event);
}
