//! # Scheduler: registrar for recurring containers and one-off tasks.
//!
//! The [`Scheduler`] holds no scheduling math of its own. It wraps tasks in
//! [`RecurringTask`] containers and starts them, arms one-off tasks at an
//! absolute start time, fans bus events out to subscribers, and relays the
//! global stop signal.
//!
//! ## Architecture
//! ```text
//! add_recurring(task, rule) ──► RecurringTask::start() ──► dedicated worker
//! add_recurring(task, rule) ──► RecurringTask::start() ──► dedicated worker
//! schedule_once(task, at)   ──► one-off lane (sleep → run once)
//!
//! workers ── publish(Event) ──► Bus ──► subscriber listener ──► Subscriber::on_event
//!
//! stop():
//!   ├─► publish ShutdownRequested (global)
//!   ├─► cancel one-off lane, join its tasks
//!   ├─► shutdown_now() every container
//!   └─► await_termination under cfg.grace
//!         └─ stragglers → Err(GraceExceeded { stuck })
//! ```
//!
//! Containers execute with second precision: start times are floored and
//! delays truncated to whole seconds before the timer is armed. Each
//! container runs on its own worker, so two tasks touching the same
//! resource can run at the same time — the scheduler does not detect
//! collisions.

use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::clock::{floor_date_time, seconds_until, FloorUnit};
use crate::config::SchedulerConfig;
use crate::core::container::RecurringTask;
use crate::core::signal;
use crate::error::{SchedulerError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::recurrence::Recurrence;
use crate::subscribers::Subscriber;
use crate::tasks::TaskRef;

/// Registrar for recurring containers and one-off work.
///
/// Must be created inside a Tokio runtime (it spawns the subscriber
/// listener and the one-off lane there).
///
/// # Example
/// ```no_run
/// use chrono::{Local, TimeDelta};
/// use tokio_util::sync::CancellationToken;
/// use cadent::{Recurrence, Scheduler, SchedulerConfig, TaskError, TaskFn};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), cadent::SchedulerError> {
///     let scheduler = Scheduler::new(SchedulerConfig::default(), Vec::new());
///
///     let sync = TaskFn::arc("sync", |_ctx: CancellationToken| async {
///         // do work...
///         Ok::<_, TaskError>(())
///     });
///     let rule = Recurrence::fixed_rate(Local::now(), TimeDelta::minutes(15), None)?;
///     scheduler.add_recurring(sync, rule);
///
///     // Park until SIGINT/SIGTERM, then interrupt everything.
///     scheduler.run_until_signal().await
/// }
/// ```
pub struct Scheduler {
    cfg: SchedulerConfig,
    bus: Bus,
    containers: Mutex<Vec<Arc<RecurringTask>>>,
    oneshot_kill: CancellationToken,
    oneshots: Mutex<Vec<(Arc<str>, JoinHandle<()>)>>,
}

impl Scheduler {
    /// Creates a scheduler and spawns its subscriber listener.
    pub fn new(cfg: SchedulerConfig, subscribers: Vec<Arc<dyn Subscriber>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        if !subscribers.is_empty() {
            Self::spawn_subscriber_listener(&bus, subscribers);
        }
        Self {
            cfg,
            bus,
            containers: Mutex::new(Vec::new()),
            oneshot_kill: CancellationToken::new(),
            oneshots: Mutex::new(Vec::new()),
        }
    }

    /// Returns an independent receiver for the scheduler's event stream.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Wraps `task` in a recurring container driven by `recurrence`,
    /// starts it, and registers it.
    ///
    /// The container takes its name from the task and inherits the
    /// configured failure policy.
    pub fn add_recurring(&self, task: TaskRef, recurrence: Recurrence) -> Arc<RecurringTask> {
        let name = task.name().to_string();
        let container = Arc::new(RecurringTask::new(
            name,
            task,
            recurrence,
            self.cfg.on_failure,
            self.bus.clone(),
        ));
        self.register(container.clone());
        container
    }

    /// Starts an externally built container and registers it.
    pub fn register(&self, container: Arc<RecurringTask>) {
        container.start();
        self.containers.lock().push(container);
    }

    /// Schedules `task` to run exactly once at `start_at`.
    ///
    /// Errors with [`SchedulerError::PastStartTime`] if `start_at` already
    /// passed — a past time is never silently coerced to "now". The start
    /// time is floored to whole seconds before the delay is computed.
    pub fn schedule_once(
        &self,
        task: TaskRef,
        start_at: DateTime<Local>,
    ) -> Result<(), SchedulerError> {
        let now = Local::now();
        if start_at < now {
            return Err(SchedulerError::PastStartTime { start_at, now });
        }
        let start_at = floor_date_time(start_at, FloorUnit::Second);
        let delay = seconds_until(start_at, now);

        let name: Arc<str> = task.name().into();
        self.bus.publish(
            Event::new(EventKind::OneShotScheduled)
                .with_task(name.clone())
                .with_delay(delay),
        );

        let kill = self.oneshot_kill.child_token();
        let bus = self.bus.clone();
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = kill.cancelled() => return,
            }

            bus.publish(
                Event::new(EventKind::FiringStarted)
                    .with_task(task_name.clone())
                    .with_firing(1),
            );

            let child = kill.child_token();
            let attempt = task.run(child.clone());
            tokio::pin!(attempt);
            let res = select! {
                res = &mut attempt => res,
                _ = kill.cancelled() => {
                    child.cancel();
                    Err(TaskError::Canceled)
                }
            };
            match res {
                Ok(()) => bus.publish(
                    Event::new(EventKind::FiringCompleted)
                        .with_task(task_name)
                        .with_firing(1),
                ),
                Err(TaskError::Canceled) => {}
                Err(err) => bus.publish(
                    Event::new(EventKind::FiringFailed)
                        .with_task(task_name)
                        .with_firing(1)
                        .with_reason(err.to_string()),
                ),
            }
        });
        self.oneshots.lock().push((name, handle));
        Ok(())
    }

    /// Returns the first registered container with the given name.
    pub fn find(&self, name: &str) -> Option<Arc<RecurringTask>> {
        self.containers
            .lock()
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }

    /// Forcefully stops everything: interrupts the one-off lane and every
    /// registered container, then waits up to the configured grace for
    /// workers to drain.
    ///
    /// Errors with [`SchedulerError::GraceExceeded`] naming the stragglers
    /// if the grace period runs out.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.oneshot_kill.cancel();

        let deadline = time::Instant::now() + self.cfg.grace;
        let mut stuck = Vec::new();

        let oneshots: Vec<_> = self.oneshots.lock().drain(..).collect();
        for (name, mut handle) in oneshots {
            let left = deadline.saturating_duration_since(time::Instant::now());
            if time::timeout(left, &mut handle).await.is_err() {
                stuck.push(name.to_string());
            }
        }

        let containers: Vec<_> = self.containers.lock().clone();
        for container in &containers {
            container.shutdown_now();
        }
        for container in &containers {
            let left = deadline.saturating_duration_since(time::Instant::now());
            if let Ok(false) = container.await_termination(left).await {
                stuck.push(container.name().to_string());
            }
        }

        if stuck.is_empty() {
            Ok(())
        } else {
            Err(SchedulerError::GraceExceeded {
                grace: self.cfg.grace,
                stuck,
            })
        }
    }

    /// Parks until the process receives a termination signal, then runs
    /// [`stop`](Self::stop).
    pub async fn run_until_signal(&self) -> Result<(), SchedulerError> {
        signal::wait_for_termination().await?;
        self.stop().await
    }

    /// Forwards every bus event to each subscriber, in order.
    fn spawn_subscriber_listener(bus: &Bus, subscribers: Vec<Arc<dyn Subscriber>>) {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        for sub in &subscribers {
                            sub.on_event(&ev).await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}
