//! # Unit of work: the [`Task`] trait.
//!
//! A task is the side-effecting callable a recurrence drives. It receives a
//! [`CancellationToken`] and should check it at blocking points so a forced
//! shutdown can interrupt it promptly. The common handle type is
//! [`TaskRef`], an `Arc<dyn Task>` suitable for sharing with the scheduler.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a unit of work.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit of work.
///
/// A `Task` has a stable [`name`](Task::name) and an async
/// [`run`](Task::run) method that receives a [`CancellationToken`]. The
/// token is the interruption channel: a forced shutdown cancels it, and a
/// cooperative task returns [`TaskError::Canceled`] when it notices. Tasks
/// that ignore the token are still stopped — the worker abandons the run —
/// but lose the chance to clean up.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use cadent::{Task, TaskError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Task for Heartbeat {
///     fn name(&self) -> &str {
///         "heartbeat"
///     }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes one run of the task, exiting quickly when `ctx` is
    /// cancelled.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}
