//! # cadent
//!
//! **Cadent** is a recurrence-driven task scheduling library for Tokio.
//!
//! It computes "next execution time" under pluggable recurrence rules and
//! drives repeated execution of a unit of work against that schedule, using
//! wall-clock time — so schedules follow clock changes, DST shifts, and
//! leap-second smearing.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐      ┌──────────────┐      ┌──────────────┐
//!     │   TaskRef    │      │   TaskRef    │      │   TaskRef    │
//!     │ + Recurrence │      │ + Recurrence │      │ + Recurrence │
//!     └──────┬───────┘      └──────┬───────┘      └──────┬───────┘
//!            ▼                     ▼                     ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler (registrar)                                            │
//! │  - wraps each pair in a RecurringTask container and starts it     │
//! │  - one-off lane: run a task once at an absolute start time        │
//! │  - Bus (broadcast events) → Subscriber fan-out                    │
//! │  - global stop: interrupt everything, wait with grace             │
//! └──────┬──────────────────────┬──────────────────────┬─────────────┘
//!        ▼                      ▼                      ▼
//! ┌──────────────┐      ┌──────────────┐      ┌──────────────┐
//! │ RecurringTask│      │ RecurringTask│      │ RecurringTask│
//! │  (worker)    │      │  (worker)    │      │  (worker)    │
//! └──────┬───────┘      └──────┬───────┘      └──────┬───────┘
//!        │  each cycle: recurrence.next(now) → sleep → run → re-arm
//!        ▼                     ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The timer primitive underneath only knows "run this once, after D whole
//! seconds". Each container turns that into a recurring schedule by
//! re-arming itself after every run, asking its [`Recurrence`] for a fresh
//! next-execution-time each cycle — the delay is recomputed every time, not
//! a constant period.
//!
//! ## Recurrence strategies
//! | Strategy | Next execution time | Drift behavior |
//! |---|---|---|
//! | [`DayOfWeekRecurrence`] | nearest configured weekday at a time-of-day | calendar-pinned, unlimited |
//! | [`FixedRateRecurrence`] | next grid point `anchor + k·every` | catches up by skipping, never bursts |
//! | [`FixedDelayRecurrence`] | `now + every` (anchor until first due) | drifts with run duration |
//!
//! Bounded rules carry a query limit; once spent, the rule is exhausted for
//! good and its container ends the recurrence cleanly.
//!
//! ## Concurrency model
//! - Each container owns exactly one sequential worker: runs never overlap
//!   for a single container, and the next firing is computed only after the
//!   previous run returns.
//! - Different containers are independent and run concurrently.
//! - `start` / `shutdown` / `shutdown_now` are non-blocking control
//!   signals; `await_termination` blocks (bounded) until the worker drains.
//! - Shutdown is sticky: a container can never be restarted.
//!
//! ## Features
//! | Area | Description | Key types / traits |
//! |---|---|---|
//! | **Recurrences** | Pluggable next-execution-time strategies. | [`Recurrence`] |
//! | **Containers**  | Self-rescheduling single-shot execution.  | [`RecurringTask`], [`RunState`] |
//! | **Registrar**   | Container registry, one-off lane, global stop. | [`Scheduler`] |
//! | **Tasks**       | Cancelable async units of work. | [`Task`], [`TaskFn`], [`TaskRef`] |
//! | **Events**      | Firing lifecycle observability. | [`Event`], [`EventKind`], [`Subscriber`] |
//! | **Errors**      | Construction vs execution failures. | [`SchedulerError`], [`TaskError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::collections::HashSet;
//! use chrono::{NaiveTime, Weekday};
//! use tokio_util::sync::CancellationToken;
//! use cadent::{Recurrence, Scheduler, SchedulerConfig, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), cadent::SchedulerError> {
//!     let scheduler = Scheduler::new(SchedulerConfig::default(), Vec::new());
//!
//!     // Every Monday and Thursday at 09:00, local time.
//!     let rule = Recurrence::day_of_week(
//!         HashSet::from([Weekday::Mon, Weekday::Thu]),
//!         NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
//!     )?;
//!
//!     let report = TaskFn::arc("weekly-report", |_ctx: CancellationToken| async {
//!         // do work...
//!         Ok::<_, TaskError>(())
//!     });
//!     scheduler.add_recurring(report, rule);
//!
//!     scheduler.run_until_signal().await
//! }
//! ```

mod clock;
mod config;
mod core;
mod error;
mod events;
mod recurrence;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use clock::{floor_date_time, seconds_until, FloorUnit};
pub use config::{FailurePolicy, SchedulerConfig};
pub use core::{RecurringTask, RunState, Scheduler};
pub use error::{SchedulerError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use recurrence::{
    DayOfWeekRecurrence, FixedDelayRecurrence, FixedRateRecurrence, Recurrence,
};
pub use subscribers::Subscriber;
pub use tasks::{Task, TaskFn, TaskRef};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
