//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! Enabled via the `logging` feature; primarily useful for development
//! and examples.
//!
//! ## Output format
//! ```text
//! [scheduled] task=nightly delay=3600s
//! [firing] task=nightly firing=3
//! [completed] task=nightly firing=3
//! [failed] task=nightly firing=3 err="connection refused"
//! [exhausted] task=nightly
//! [terminated] task=nightly
//! [one-shot] task=report delay=60s
//! [shutdown-requested] task=nightly
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscriber;

/// Simple stdout logging subscriber.
///
/// Not intended for production use - implement a custom [`Subscriber`] for
/// structured logging or metrics collection.
pub struct LogWriter;

fn fmt_task(ev: &Event) -> &str {
    ev.task.as_deref().unwrap_or("-")
}

#[async_trait]
impl Subscriber for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::FiringScheduled => {
                let secs = e.delay.map(|d| d.as_secs()).unwrap_or(0);
                println!("[scheduled] task={} delay={}s", fmt_task(e), secs);
            }
            EventKind::FiringStarted => {
                println!("[firing] task={} firing={:?}", fmt_task(e), e.firing);
            }
            EventKind::FiringCompleted => {
                println!("[completed] task={} firing={:?}", fmt_task(e), e.firing);
            }
            EventKind::FiringFailed => {
                println!(
                    "[failed] task={} firing={:?} err={:?}",
                    fmt_task(e),
                    e.firing,
                    e.reason
                );
            }
            EventKind::RecurrenceExhausted => {
                println!("[exhausted] task={}", fmt_task(e));
            }
            EventKind::ContainerTerminated => {
                println!("[terminated] task={}", fmt_task(e));
            }
            EventKind::OneShotScheduled => {
                let secs = e.delay.map(|d| d.as_secs()).unwrap_or(0);
                println!("[one-shot] task={} delay={}s", fmt_task(e), secs);
            }
            EventKind::ShutdownRequested => match &e.task {
                Some(task) => println!("[shutdown-requested] task={task}"),
                None => println!("[shutdown-requested]"),
            },
        }
    }
}
