use chrono::{DateTime, NaiveDateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use kitty_domain::schedule::{next_run_at, TaskStatus};
use kitty_domain::setting::validate_hour;
use kitty_domain::DomainError;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::clock::{Clock, LocalClock};

/// Work performed on every run
pub type TaskAction = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Runs an action now and then once a day at a fixed local hour.
///
/// - `status` is `Running` only while the action is in flight
/// - at most one future run is armed
/// - runs never overlap
/// - a failed run halts the cycle until the next `start()`
pub struct ScheduledTask<C: Clock = LocalClock> {
    inner: Arc<TaskInner<C>>,
}

impl<C: Clock> Clone for ScheduledTask<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PendingRun {
    handle: JoinHandle<()>,
    at: DateTime<Utc>,
}

struct TaskInner<C: Clock> {
    name: String,
    hour: u32,
    action: TaskAction,
    clock: C,
    status: watch::Sender<TaskStatus>,
    timer: Mutex<Option<PendingRun>>,
    /// Held for the whole duration of a run
    run_lock: Mutex<()>,
    /// Bumped by every start/stop; a run only re-arms if it is still current
    generation: AtomicU64,
}

impl ScheduledTask<LocalClock> {
    pub fn new<F, Fut>(name: impl Into<String>, hour: u32, action: F) -> Result<Self, DomainError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::with_clock(name, hour, LocalClock, action)
    }
}

impl<C: Clock> ScheduledTask<C> {
    pub fn with_clock<F, Fut>(
        name: impl Into<String>,
        hour: u32,
        clock: C,
        action: F,
    ) -> Result<Self, DomainError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let hour = validate_hour(hour)?;
        let action: TaskAction = Arc::new(move || action().boxed());
        let (status, _) = watch::channel(TaskStatus::Stopped);

        Ok(Self {
            inner: Arc::new(TaskInner {
                name: name.into(),
                hour,
                action,
                clock,
                status,
                timer: Mutex::new(None),
                run_lock: Mutex::new(()),
                generation: AtomicU64::new(0),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn hour(&self) -> u32 {
        self.inner.hour
    }

    /// Cancel any armed run, run the action now and, if it succeeds, arm
    /// the next daily run.
    ///
    /// Failures are logged and end the cycle; they are not returned. A start
    /// that is superseded by a later `start()` or `stop()` before its run
    /// begins does nothing.
    pub async fn start(&self) {
        let generation = {
            let mut timer = self.inner.timer.lock().await;
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            disarm(&mut timer);
            generation
        };
        Arc::clone(&self.inner).run_cycle(generation).await;
    }

    /// Cancel any armed run and force the status to `Stopped`.
    ///
    /// A run already in flight completes but does not re-arm.
    pub async fn stop(&self) {
        let had_timer = {
            let mut timer = self.inner.timer.lock().await;
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            self.inner.status.send_replace(TaskStatus::Stopped);
            disarm(&mut timer)
        };

        if had_timer {
            info!(task = %self.inner.name, "🛑 Scheduled task stopped");
        }
    }

    /// Stop and release the task
    pub async fn shutdown(self) {
        self.stop().await;
    }

    /// Current status
    pub fn current_status(&self) -> TaskStatus {
        *self.inner.status.borrow()
    }

    /// Receiver notified on every status change
    pub fn status(&self) -> watch::Receiver<TaskStatus> {
        self.inner.status.subscribe()
    }

    /// Instant of the armed run, if any
    pub async fn next_run_at(&self) -> Option<DateTime<Utc>> {
        self.inner.timer.lock().await.as_ref().map(|pending| pending.at)
    }
}

impl<C: Clock> TaskInner<C> {
    /// One run plus re-arming. Boxed so the timer can spawn it.
    fn run_cycle(self: Arc<Self>, generation: u64) -> BoxFuture<'static, ()> {
        async move {
            let _running = self.run_lock.lock().await;

            {
                // start/stop bump the generation under this lock
                let mut timer = self.timer.lock().await;
                if self.generation.load(Ordering::SeqCst) != generation {
                    debug!(task = %self.name, "Run superseded before it began");
                    return;
                }
                // A timer that fired has done its job
                disarm(&mut timer);
                self.status.send_replace(TaskStatus::Running);
            }
            debug!(task = %self.name, "⏰ Running scheduled task");

            let outcome = AssertUnwindSafe((self.action)()).catch_unwind().await;

            self.status.send_replace(TaskStatus::Stopped);

            match outcome {
                Ok(Ok(())) => {
                    if self.generation.load(Ordering::SeqCst) == generation {
                        self.arm(generation).await;
                    } else {
                        debug!(task = %self.name, "Task restarted or stopped during run, not re-arming");
                    }
                }
                Ok(Err(e)) => {
                    warn!(task = %self.name, error = %e, "❌ Scheduled task failed, cycle halted");
                }
                Err(_) => {
                    error!(task = %self.name, "❌ Scheduled task panicked, cycle halted");
                }
            }
        }
        .boxed()
    }

    async fn arm(self: &Arc<Self>, generation: u64) {
        let (at, delay, local) = match self.plan_next_run() {
            Ok(plan) => plan,
            Err(e) => {
                error!(task = %self.name, error = %e, "Failed to compute next run");
                return;
            }
        };

        let mut timer = self.timer.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(task = %self.name, "Task restarted or stopped during run, not re-arming");
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let Some(inner) = weak.upgrade() else {
                return;
            };
            // Detached so that cancelling the timer never cancels the run
            tokio::spawn(inner.run_cycle(generation));
        });

        disarm(&mut timer);
        *timer = Some(PendingRun { handle, at });
        drop(timer);

        info!(
            task = %self.name,
            hour = self.hour,
            next_run = %local.format("%Y-%m-%d %H:%M:%S"),
            delay_secs = delay.as_secs(),
            "📅 Next run scheduled"
        );
    }

    fn plan_next_run(&self) -> Result<(DateTime<Utc>, Duration, NaiveDateTime), DomainError> {
        let now = self.clock.now();
        let next = next_run_at(&now, self.hour)?;
        let delay = next
            .clone()
            .signed_duration_since(now)
            .to_std()
            .unwrap_or(Duration::ZERO);
        Ok((next.with_timezone(&Utc), delay, next.naive_local()))
    }
}

/// Abort the armed run. Returns whether one was armed.
fn disarm(timer: &mut Option<PendingRun>) -> bool {
    match timer.take() {
        Some(pending) => {
            pending.handle.abort();
            true
        }
        None => false,
    }
}

impl<C: Clock> Drop for TaskInner<C> {
    fn drop(&mut self) {
        disarm(self.timer.get_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::scheduler::AnchoredClock;
    use chrono::TimeZone;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;
    use tokio::time::sleep;

    const HOUR: Duration = Duration::from_secs(3600);

    fn ten_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap()
    }

    fn counting_task(hour: u32, runs: Arc<AtomicUsize>) -> ScheduledTask<AnchoredClock<Utc>> {
        ScheduledTask::with_clock("test", hour, AnchoredClock::new(ten_am()), move || {
            let runs = runs.clone();
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(())
            }
        })
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_runs_once_and_arms_next_day() {
        let runs = Arc::new(AtomicUsize::new(0));
        let task = counting_task(3, runs.clone());

        task.start().await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(task.current_status(), TaskStatus::Stopped);
        assert_eq!(
            task.next_run_at().await,
            Some(Utc.with_ymd_and_hms(2024, 6, 16, 3, 0, 0).unwrap())
        );

        sleep(17 * HOUR - Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(
            task.next_run_at().await,
            Some(Utc.with_ymd_and_hms(2024, 6, 17, 3, 0, 0).unwrap())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let runs = Arc::new(AtomicUsize::new(0));
        let task = counting_task(3, runs.clone());

        task.stop().await;
        task.stop().await;
        assert_eq!(task.current_status(), TaskStatus::Stopped);

        task.start().await;
        task.stop().await;
        task.stop().await;
        assert_eq!(task.current_status(), TaskStatus::Stopped);
        assert!(task.next_run_at().await.is_none());

        sleep(48 * HOUR).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_halts_cycle() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let task = ScheduledTask::with_clock("failing", 3, AnchoredClock::new(ten_am()), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(anyhow::anyhow!("backend unreachable"))
            }
        })
        .unwrap();

        task.start().await;
        assert_eq!(task.current_status(), TaskStatus::Stopped);
        assert!(task.next_run_at().await.is_none());

        sleep(48 * HOUR).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // Only an explicit start resumes the cycle
        task.start().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_action_is_a_failure() {
        fn explode() -> anyhow::Result<()> {
            panic!("boom")
        }

        let task = ScheduledTask::with_clock("panics", 3, AnchoredClock::new(ten_am()), || async {
            explode()
        })
        .unwrap();

        task.start().await;
        assert_eq!(task.current_status(), TaskStatus::Stopped);
        assert!(task.next_run_at().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_running_only_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let action_gate = gate.clone();
        let task = ScheduledTask::with_clock("gated", 3, AnchoredClock::new(ten_am()), move || {
            let gate = action_gate.clone();
            async move {
                gate.notified().await;
                anyhow::Ok(())
            }
        })
        .unwrap();

        let mut status = task.status();
        let runner = task.clone();
        let start = tokio::spawn(async move { runner.start().await });

        status.wait_for(|s| s.is_running()).await.unwrap();
        assert_eq!(task.current_status(), TaskStatus::Running);

        gate.notify_one();
        start.await.unwrap();
        assert_eq!(task.current_status(), TaskStatus::Stopped);
        assert!(task.next_run_at().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_pending_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let task = counting_task(3, runs.clone());

        task.start().await;
        sleep(5 * HOUR).await;

        task.start().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        // Both starts target 03:00 tomorrow; only one run may fire
        sleep(12 * HOUR + Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_starts_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));

        let (current, max) = (in_flight.clone(), max_in_flight.clone());
        let task = ScheduledTask::with_clock("slow", 3, AnchoredClock::new(ten_am()), move || {
            let (current, max) = (current.clone(), max.clone());
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                sleep(HOUR).await;
                current.fetch_sub(1, Ordering::SeqCst);
                anyhow::Ok(())
            }
        })
        .unwrap();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let task = task.clone();
                tokio::spawn(async move { task.start().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(task.current_status(), TaskStatus::Stopped);
        assert!(task.next_run_at().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_run_prevents_rearm() {
        let gate = Arc::new(Notify::new());
        let action_gate = gate.clone();
        let task = ScheduledTask::with_clock("gated", 3, AnchoredClock::new(ten_am()), move || {
            let gate = action_gate.clone();
            async move {
                gate.notified().await;
                anyhow::Ok(())
            }
        })
        .unwrap();

        let mut status = task.status();
        let runner = task.clone();
        let start = tokio::spawn(async move { runner.start().await });
        status.wait_for(|s| s.is_running()).await.unwrap();

        task.stop().await;
        assert_eq!(task.current_status(), TaskStatus::Stopped);

        gate.notify_one();
        start.await.unwrap();
        assert!(task.next_run_at().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_never_arms_after_stop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let task = counting_task(3, runs.clone());

        task.start().await;
        let stale = task.inner.generation.load(Ordering::SeqCst);
        task.stop().await;

        // A cycle that finished just as stop() landed tries to re-arm
        task.inner.arm(stale).await;
        assert!(task.next_run_at().await.is_none());

        // A timer that fired just as stop() landed tries to run
        Arc::clone(&task.inner).run_cycle(stale).await;
        assert_eq!(task.current_status(), TaskStatus::Stopped);

        sleep(48 * HOUR).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_never_replaces_restarted_timer() {
        let runs = Arc::new(AtomicUsize::new(0));
        let task = counting_task(3, runs.clone());

        task.start().await;
        let stale = task.inner.generation.load(Ordering::SeqCst);
        task.start().await;
        let armed = task.next_run_at().await;

        task.inner.arm(stale).await;
        assert_eq!(task.next_run_at().await, armed);

        sleep(17 * HOUR + Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_task_cancels_timer() {
        let runs = Arc::new(AtomicUsize::new(0));
        let task = counting_task(3, runs.clone());

        task.start().await;
        drop(task);

        sleep(48 * HOUR).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_hour_rejected() {
        let result = ScheduledTask::new("bad", 24, || async { anyhow::Ok(()) });
        assert!(result.is_err());
    }
}
