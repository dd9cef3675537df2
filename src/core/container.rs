//! # RecurringTask: self-rescheduling container for one task + one recurrence.
//!
//! The underlying timer primitive only knows "run this once, after a delay".
//! [`RecurringTask`] turns that into a recurring schedule with an explicit
//! loop on a dedicated worker: each cycle queries the recurrence for the
//! next execution time, arms a single-shot sleep, runs the task, and
//! re-arms. The delay is recomputed from the recurrence every cycle — it is
//! not a constant period.
//!
//! ## Worker loop
//! ```text
//! start() ──► spawn worker
//!
//! loop {
//!   ├─► stop requested? ──────────────► break
//!   ├─► recurrence.next(Local::now())
//!   │     ├─ None ──► publish RecurrenceExhausted ──► break
//!   │     └─ Some(next_at)
//!   ├─► delay = whole seconds until next_at (>= 0)
//!   ├─► publish FiringScheduled { delay }
//!   ├─► sleep(delay)            (aborted by shutdown_now)
//!   ├─► publish FiringStarted { firing }
//!   ├─► task.run(child token)   (abandoned by shutdown_now)
//!   │     ├─ Ok        ──► publish FiringCompleted
//!   │     ├─ Canceled  ──► break
//!   │     └─ Err ──► publish FiringFailed
//!   │                 └─ FailurePolicy::Abort? ──► break
//!   └─► continue (the re-arm IS the recurrence)
//! }
//!
//! state = Terminated, publish ContainerTerminated
//! ```
//!
//! ## Rules
//! - One sequential worker per container: at most one run in flight, firing
//!   N+1 is computed only after firing N returns. No overlap, no queue
//!   buildup. A long run under a fixed-rate rule skips grid points, it
//!   never fires them back-to-back.
//! - Lifecycle is a lock-guarded state machine ([`RunState`]); terminal
//!   states are sticky and a container can never be restarted.
//! - `start`, `shutdown`, `shutdown_now` are non-blocking control signals;
//!   [`await_termination`](RecurringTask::await_termination) is the only
//!   (bounded) blocking call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::clock::seconds_until;
use crate::config::FailurePolicy;
use crate::error::{SchedulerError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::recurrence::Recurrence;
use crate::tasks::TaskRef;

/// Lifecycle of a [`RecurringTask`].
///
/// ```text
/// Idle ──start──► Scheduled ◄────────┐
///                    │ timer fires   │ re-arm
///                    ▼               │
///                 Running ───────────┘
///                    │
///     shutdown / shutdown_now / exhaustion
///                    ▼
///              ShuttingDown ──worker drained──► Terminated
/// ```
///
/// `ShuttingDown` and `Terminated` are sticky: once entered, the only
/// transition left is `ShuttingDown → Terminated`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Created, not started.
    Idle,
    /// Worker armed, waiting for the next firing.
    Scheduled,
    /// A firing is executing the task.
    Running,
    /// Shutdown requested; no further firing will be scheduled.
    ShuttingDown,
    /// Worker exited; the container is permanently done.
    Terminated,
}

/// Container driving one task on one recurrence.
///
/// Owns the task, the recurrence (exclusively) and a dedicated sequential
/// worker. Names identify containers in events and lookups but are not
/// required to be unique.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use chrono::{Local, TimeDelta};
/// use tokio_util::sync::CancellationToken;
/// use cadent::{Bus, FailurePolicy, Recurrence, RecurringTask, TaskError, TaskFn};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), cadent::SchedulerError> {
///     let bus = Bus::new(64);
///     let work = TaskFn::arc("heartbeat", |_ctx: CancellationToken| async {
///         println!("beat");
///         Ok::<_, TaskError>(())
///     });
///     let rule = Recurrence::fixed_delay(Local::now(), TimeDelta::seconds(30), None)?;
///
///     let container = RecurringTask::new("heartbeat", work, rule, FailurePolicy::Continue, bus);
///     container.start();
///
///     // ... later:
///     container.shutdown();
///     container.await_termination(Duration::from_secs(60)).await?;
///     Ok(())
/// }
/// ```
pub struct RecurringTask {
    name: Arc<str>,
    state: Arc<Mutex<RunState>>,
    /// Best-effort observable flag, distinct from the state machine:
    /// set by `start`, cleared by `shutdown_now` and `await_termination`.
    started: AtomicBool,
    /// Graceful stop: checked between cycles, never interrupts a firing.
    stop: Arc<AtomicBool>,
    /// Forceful stop: aborts pending sleeps and in-flight runs.
    kill: CancellationToken,
    seed: Mutex<Option<Seed>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    bus: Bus,
}

/// Everything the worker takes ownership of on `start`.
struct Seed {
    task: TaskRef,
    recurrence: Recurrence,
    on_failure: FailurePolicy,
}

impl RecurringTask {
    /// Creates a container for `task` driven by `recurrence`.
    ///
    /// Lifecycle events are published on `bus`; `on_failure` decides
    /// whether a failing run ends the recurrence.
    pub fn new(
        name: impl Into<Arc<str>>,
        task: TaskRef,
        recurrence: Recurrence,
        on_failure: FailurePolicy,
        bus: Bus,
    ) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(RunState::Idle)),
            started: AtomicBool::new(false),
            stop: Arc::new(AtomicBool::new(false)),
            kill: CancellationToken::new(),
            seed: Mutex::new(Some(Seed {
                task,
                recurrence,
                on_failure,
            })),
            worker: Mutex::new(None),
            bus,
        }
    }

    /// Returns the container name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> RunState {
        *self.state.lock()
    }

    /// Best-effort: whether this container has started running.
    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Starts the worker. Must be called inside a Tokio runtime.
    ///
    /// No-op if already started or if a shutdown was requested; a
    /// container is started at most once and never restarted.
    pub fn start(&self) {
        if self.stop.load(Ordering::SeqCst) || self.kill.is_cancelled() {
            return;
        }
        let Some(seed) = self.seed.lock().take() else {
            return;
        };

        {
            let mut st = self.state.lock();
            if *st == RunState::Idle {
                *st = RunState::Scheduled;
            }
        }
        self.started.store(true, Ordering::SeqCst);

        let worker = Worker {
            name: self.name.clone(),
            task: seed.task,
            recurrence: seed.recurrence,
            on_failure: seed.on_failure,
            state: self.state.clone(),
            stop: self.stop.clone(),
            kill: self.kill.clone(),
            bus: self.bus.clone(),
        };
        *self.worker.lock() = Some(tokio::spawn(worker.run()));
    }

    /// Requests a graceful stop.
    ///
    /// The firing currently running — or already armed on the timer —
    /// still completes; nothing is scheduled after it. Sticky.
    pub fn shutdown(&self) {
        if !self.stop.swap(true, Ordering::SeqCst) {
            self.bus
                .publish(Event::new(EventKind::ShutdownRequested).with_task(self.name.clone()));
        }
        self.mark_shutting_down();
    }

    /// Requests a forceful stop.
    ///
    /// Aborts a pending sleep, interrupts an in-flight run through its
    /// cancellation token (and abandons it if it does not cooperate), and
    /// clears the started flag immediately. Does not wait. Sticky.
    pub fn shutdown_now(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.mark_shutting_down();
        if !self.kill.is_cancelled() {
            self.kill.cancel();
            self.bus.publish(
                Event::new(EventKind::ShutdownRequested)
                    .with_task(self.name.clone())
                    .with_reason("forced"),
            );
        }
        self.started.store(false, Ordering::SeqCst);
    }

    /// Waits until the worker is idle, bounded by `timeout`.
    ///
    /// Only legal after [`shutdown`](Self::shutdown) or
    /// [`shutdown_now`](Self::shutdown_now); errors with
    /// [`SchedulerError::NotShutDown`] otherwise. Returns `Ok(true)` if the
    /// worker drained in time, `Ok(false)` on timeout (a normal outcome,
    /// not an error). Clears the started flag on return.
    pub async fn await_termination(&self, timeout: Duration) -> Result<bool, SchedulerError> {
        if !self.stop.load(Ordering::SeqCst) && !self.kill.is_cancelled() {
            return Err(SchedulerError::NotShutDown {
                task: self.name.to_string(),
            });
        }

        let handle = self.worker.lock().take();
        let idle = match handle {
            None => true,
            Some(mut handle) => match time::timeout(timeout, &mut handle).await {
                // A worker panic still means the worker is gone: idle.
                Ok(_join_result) => true,
                Err(_elapsed) => {
                    *self.worker.lock() = Some(handle);
                    false
                }
            },
        };

        if idle {
            *self.state.lock() = RunState::Terminated;
        }
        self.started.store(false, Ordering::SeqCst);
        Ok(idle)
    }

    fn mark_shutting_down(&self) {
        let mut st = self.state.lock();
        if *st != RunState::Terminated {
            *st = RunState::ShuttingDown;
        }
    }
}

/// The dedicated sequential worker behind one container.
struct Worker {
    name: Arc<str>,
    task: TaskRef,
    recurrence: Recurrence,
    on_failure: FailurePolicy,
    state: Arc<Mutex<RunState>>,
    stop: Arc<AtomicBool>,
    kill: CancellationToken,
    bus: Bus,
}

impl Worker {
    /// Runs the self-rescheduling loop until shutdown or exhaustion.
    async fn run(mut self) {
        let mut firing: u64 = 0;

        loop {
            if self.kill.is_cancelled() || self.stop.load(Ordering::SeqCst) {
                break;
            }

            let now = Local::now();
            let Some(next_at) = self.recurrence.next(now) else {
                self.bus.publish(
                    Event::new(EventKind::RecurrenceExhausted).with_task(self.name.clone()),
                );
                break;
            };
            let delay = seconds_until(next_at, now);

            self.advance(RunState::Scheduled);
            self.bus.publish(
                Event::new(EventKind::FiringScheduled)
                    .with_task(self.name.clone())
                    .with_delay(delay),
            );

            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = self.kill.cancelled() => break,
            }
            // A graceful stop observed while asleep still lets this armed
            // firing run; the loop head ends the cycle afterwards.

            firing += 1;
            self.advance(RunState::Running);
            self.bus.publish(
                Event::new(EventKind::FiringStarted)
                    .with_task(self.name.clone())
                    .with_firing(firing),
            );

            match self.run_once().await {
                Ok(()) => {
                    self.bus.publish(
                        Event::new(EventKind::FiringCompleted)
                            .with_task(self.name.clone())
                            .with_firing(firing),
                    );
                }
                Err(TaskError::Canceled) => break,
                Err(err) => {
                    self.bus.publish(
                        Event::new(EventKind::FiringFailed)
                            .with_task(self.name.clone())
                            .with_firing(firing)
                            .with_reason(err.to_string()),
                    );
                    if self.on_failure == FailurePolicy::Abort {
                        break;
                    }
                }
            }
        }

        *self.state.lock() = RunState::Terminated;
        self.bus
            .publish(Event::new(EventKind::ContainerTerminated).with_task(self.name.clone()));
    }

    /// Executes one run, interruptible by the kill token.
    ///
    /// The run gets a child token so a cooperative task can clean up; if it
    /// keeps running anyway the future is abandoned here.
    async fn run_once(&self) -> Result<(), TaskError> {
        let child = self.kill.child_token();
        let attempt = self.task.run(child.clone());
        tokio::pin!(attempt);
        select! {
            res = &mut attempt => res,
            _ = self.kill.cancelled() => {
                child.cancel();
                Err(TaskError::Canceled)
            }
        }
    }

    /// Moves the state machine forward without downgrading sticky states.
    fn advance(&self, to: RunState) {
        let mut st = self.state.lock();
        match *st {
            RunState::ShuttingDown | RunState::Terminated => {}
            _ => *st = to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    use chrono::TimeDelta;
    use tokio::sync::broadcast;

    use crate::tasks::TaskFn;

    /// Collects bus events until `last` is seen (bounded by a generous
    /// paused-clock timeout so a buggy worker fails fast instead of
    /// hanging).
    async fn collect_until(rx: &mut broadcast::Receiver<Event>, last: EventKind) -> Vec<Event> {
        time::timeout(Duration::from_secs(600), async {
            let mut seen = Vec::new();
            loop {
                let ev = rx.recv().await.expect("bus closed early");
                let kind = ev.kind;
                seen.push(ev);
                if kind == last {
                    return seen;
                }
            }
        })
        .await
        .expect("timed out waiting for terminal event")
    }

    fn count(events: &[Event], kind: EventKind) -> usize {
        events.iter().filter(|e| e.kind == kind).count()
    }

    fn counting_task(counter: &Arc<AtomicU64>) -> TaskRef {
        let counter = counter.clone();
        TaskFn::arc("tick", move |_ctx: CancellationToken| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        })
    }

    fn every_second(limit: Option<u64>) -> Recurrence {
        Recurrence::fixed_delay(Local::now(), TimeDelta::seconds(1), limit).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_terminates_cleanly() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let counter = Arc::new(AtomicU64::new(0));

        let container = RecurringTask::new(
            "tick",
            counting_task(&counter),
            every_second(Some(2)),
            FailurePolicy::Continue,
            bus.clone(),
        );
        container.start();
        assert!(container.has_started());

        let events = collect_until(&mut rx, EventKind::ContainerTerminated).await;
        assert_eq!(count(&events, EventKind::FiringStarted), 2);
        assert_eq!(count(&events, EventKind::FiringCompleted), 2);
        assert_eq!(count(&events, EventKind::RecurrenceExhausted), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(container.state(), RunState::Terminated);

        container.shutdown();
        assert!(container
            .await_termination(Duration::from_secs(1))
            .await
            .unwrap());
        assert!(!container.has_started());
    }

    #[tokio::test(start_paused = true)]
    async fn test_graceful_shutdown_lets_inflight_firing_complete() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let counter = Arc::new(AtomicU64::new(0));

        let slow_counter = counter.clone();
        let task: TaskRef = TaskFn::arc("slow", move |_ctx: CancellationToken| {
            let counter = slow_counter.clone();
            async move {
                time::sleep(Duration::from_secs(5)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        });

        let container = RecurringTask::new(
            "slow",
            task,
            every_second(None),
            FailurePolicy::Continue,
            bus.clone(),
        );
        container.start();

        // Wait for the first firing to be in flight, then ask nicely.
        collect_until(&mut rx, EventKind::FiringStarted).await;
        container.shutdown();

        let events = collect_until(&mut rx, EventKind::ContainerTerminated).await;
        assert_eq!(count(&events, EventKind::FiringCompleted), 1);
        assert_eq!(count(&events, EventKind::FiringStarted), 0, "no second firing");
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(container
            .await_termination(Duration::from_secs(60))
            .await
            .unwrap());
        assert_eq!(container.state(), RunState::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_now_interrupts_blocked_work() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let counter = Arc::new(AtomicU64::new(0));

        let stuck_counter = counter.clone();
        let task: TaskRef = TaskFn::arc("stuck", move |_ctx: CancellationToken| {
            let counter = stuck_counter.clone();
            async move {
                std::future::pending::<()>().await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        });

        let container = RecurringTask::new(
            "stuck",
            task,
            every_second(None),
            FailurePolicy::Continue,
            bus.clone(),
        );
        container.start();

        collect_until(&mut rx, EventKind::FiringStarted).await;
        container.shutdown_now();
        assert!(!container.has_started(), "cleared without waiting");

        assert!(container
            .await_termination(Duration::from_secs(5))
            .await
            .unwrap());
        assert_eq!(container.state(), RunState::Terminated);
        assert_eq!(counter.load(Ordering::SeqCst), 0, "work never completed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_policy_continue_survives_failing_runs() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();

        let task: TaskRef =
            TaskFn::arc("flaky", |_ctx: CancellationToken| async {
                Err::<(), _>(TaskError::fail("boom"))
            });
        let container = RecurringTask::new(
            "flaky",
            task,
            every_second(Some(3)),
            FailurePolicy::Continue,
            bus.clone(),
        );
        container.start();

        let events = collect_until(&mut rx, EventKind::ContainerTerminated).await;
        assert_eq!(count(&events, EventKind::FiringFailed), 3);
        assert_eq!(count(&events, EventKind::RecurrenceExhausted), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_policy_abort_ends_recurrence() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();

        let task: TaskRef =
            TaskFn::arc("flaky", |_ctx: CancellationToken| async {
                Err::<(), _>(TaskError::fail("boom"))
            });
        let container = RecurringTask::new(
            "flaky",
            task,
            every_second(None),
            FailurePolicy::Abort,
            bus.clone(),
        );
        container.start();

        let events = collect_until(&mut rx, EventKind::ContainerTerminated).await;
        assert_eq!(count(&events, EventKind::FiringFailed), 1);
        assert_eq!(count(&events, EventKind::FiringStarted), 1);
        assert_eq!(container.state(), RunState::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_after_shutdown_is_noop() {
        let bus = Bus::new(64);
        let counter = Arc::new(AtomicU64::new(0));

        let container = RecurringTask::new(
            "never",
            counting_task(&counter),
            every_second(None),
            FailurePolicy::Continue,
            bus.clone(),
        );
        container.shutdown();
        container.start();

        assert!(!container.has_started());
        assert!(container
            .await_termination(Duration::from_secs(1))
            .await
            .unwrap());
        assert_eq!(container.state(), RunState::Terminated);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_termination_requires_shutdown() {
        let bus = Bus::new(64);
        let counter = Arc::new(AtomicU64::new(0));

        let container = RecurringTask::new(
            "tick",
            counting_task(&counter),
            every_second(None),
            FailurePolicy::Continue,
            bus.clone(),
        );
        let err = container
            .await_termination(Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulerError::NotShutDown { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let counter = Arc::new(AtomicU64::new(0));

        let container = RecurringTask::new(
            "tick",
            counting_task(&counter),
            every_second(Some(1)),
            FailurePolicy::Continue,
            bus.clone(),
        );
        container.start();
        container.start();

        let events = collect_until(&mut rx, EventKind::ContainerTerminated).await;
        assert_eq!(count(&events, EventKind::FiringStarted), 1);
        assert_eq!(count(&events, EventKind::ContainerTerminated), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
