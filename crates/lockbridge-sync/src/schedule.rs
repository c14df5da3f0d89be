//! Periodic refresh scheduling.
//!
//! [`ScheduleState`] holds the next-refresh deadline and the interval. It is
//! shared between the refresh loop and the command dispatcher, so every
//! write is a single atomic store: `pull_forward` from a dispatched command
//! can never be lost behind the loop's own deadline advance.
//!
//! [`RefreshScheduler`] is the loop itself. It wakes every tick, runs a
//! cycle over all bound devices when the deadline has passed, and exits
//! promptly when its cancellation token fires.

use crate::synchronizer::{CycleReport, LockSynchronizer};
use lockbridge_core::constants::SCHEDULER_TICK_SECS;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info};

/// Upper bound on the loop tick; cancellation is observed within one tick.
pub const MAX_TICK: Duration = Duration::from_secs(10);

/// Lower bound on the loop tick so an idle loop never spins.
pub const MIN_TICK: Duration = Duration::from_millis(100);

/// Refresh deadline and interval shared by the loop and the dispatcher.
///
/// Times are stored as nanoseconds since the state was created.
#[derive(Debug)]
pub struct ScheduleState {
    origin: Instant,
    deadline_nanos: AtomicU64,
    interval_nanos: AtomicU64,
    cycle_running: AtomicBool,
    cycles_completed: AtomicU64,
}

/// Whether a refresh cycle is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerPhase {
    Idle,
    Running,
}

/// Point-in-time view of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleStatus {
    /// Time until the next cycle is due, zero if overdue.
    #[serde(with = "duration_secs")]
    pub next_refresh_in: Duration,
    #[serde(with = "duration_secs")]
    pub interval: Duration,
    pub phase: SchedulerPhase,
    pub cycles_completed: u64,
}

impl ScheduleState {
    /// Create a schedule whose first cycle is due immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            deadline_nanos: AtomicU64::new(0),
            interval_nanos: AtomicU64::new(to_nanos(interval)),
            cycle_running: AtomicBool::new(false),
            cycles_completed: AtomicU64::new(0),
        }
    }

    fn now_nanos(&self) -> u64 {
        to_nanos(self.origin.elapsed())
    }

    fn instant_at(&self, nanos: u64) -> Instant {
        self.origin + Duration::from_nanos(nanos)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_nanos(self.interval_nanos.load(Ordering::Acquire))
    }

    /// Change the interval used for deadlines set after this call.
    pub fn set_interval(&self, interval: Duration) {
        self.interval_nanos
            .store(to_nanos(interval), Ordering::Release);
        debug!(interval_secs = interval.as_secs(), "Refresh interval updated");
    }

    pub fn next_refresh_deadline(&self) -> Instant {
        self.instant_at(self.deadline_nanos.load(Ordering::Acquire))
    }

    /// Set the deadline to exactly now + `delay`, even if that is later than
    /// the current deadline.
    pub fn pull_forward(&self, delay: Duration) -> Instant {
        let deadline = self.now_nanos().saturating_add(to_nanos(delay));
        self.deadline_nanos.store(deadline, Ordering::Release);
        debug!(delay_ms = to_millis(delay), "Next refresh pulled forward");
        self.instant_at(deadline)
    }

    pub fn is_due(&self) -> bool {
        self.now_nanos() >= self.deadline_nanos.load(Ordering::Acquire)
    }

    /// Claim a due cycle, advancing the deadline to now + interval before the
    /// cycle runs.
    ///
    /// Returns `false` when no cycle is due. If a `pull_forward` lands
    /// between the due check and the advance, the pulled deadline wins.
    pub fn begin_cycle(&self) -> bool {
        let now = self.now_nanos();
        let observed = self.deadline_nanos.load(Ordering::Acquire);
        if now < observed {
            return false;
        }

        let next = now.saturating_add(self.interval_nanos.load(Ordering::Acquire));
        let _ = self.deadline_nanos.compare_exchange(
            observed,
            next,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.cycle_running.store(true, Ordering::Release);
        true
    }

    pub fn end_cycle(&self) {
        self.cycle_running.store(false, Ordering::Release);
        self.cycles_completed.fetch_add(1, Ordering::AcqRel);
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Acquire)
    }

    pub fn status(&self) -> ScheduleStatus {
        let now = self.now_nanos();
        let deadline = self.deadline_nanos.load(Ordering::Acquire);
        ScheduleStatus {
            next_refresh_in: Duration::from_nanos(deadline.saturating_sub(now)),
            interval: self.interval(),
            phase: if self.cycle_running.load(Ordering::Acquire) {
                SchedulerPhase::Running
            } else {
                SchedulerPhase::Idle
            },
            cycles_completed: self.cycles_completed(),
        }
    }
}

fn to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

fn to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }
}

/// Background refresh loop.
pub struct RefreshScheduler {
    schedule: Arc<ScheduleState>,
    synchronizer: Arc<LockSynchronizer>,
    tick: Duration,
}

impl RefreshScheduler {
    pub fn new(schedule: Arc<ScheduleState>, synchronizer: Arc<LockSynchronizer>) -> Self {
        Self {
            schedule,
            synchronizer,
            tick: Duration::from_secs(SCHEDULER_TICK_SECS),
        }
    }

    /// Override the tick, clamped to [`MIN_TICK`]..=[`MAX_TICK`].
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.clamp(MIN_TICK, MAX_TICK);
        self
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Spawn the loop on the current runtime.
    ///
    /// The loop is cancelled when the returned handle is dropped.
    pub fn spawn(self, token: CancellationToken) -> SchedulerHandle {
        let task = tokio::spawn(self.run(token.clone()));
        SchedulerHandle {
            _guard: token.clone().drop_guard(),
            token,
            task,
        }
    }

    /// Run one cycle if the deadline has passed.
    pub async fn run_due_cycle(&self) -> Option<CycleReport> {
        if !self.schedule.begin_cycle() {
            return None;
        }

        let report = self.synchronizer.sync_all().await;
        self.schedule.end_cycle();

        info!(
            synced = report.synced,
            failed = report.failed,
            skipped = report.skipped,
            "Refresh cycle complete"
        );
        Some(report)
    }

    async fn run(self, token: CancellationToken) {
        info!(tick_ms = to_millis(self.tick), "Refresh loop started");

        loop {
            if token.is_cancelled() {
                break;
            }

            // An in-flight cycle always completes; cancellation is only
            // observed between cycles.
            self.run_due_cycle().await;

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.tick) => {}
            }
        }

        info!("Refresh loop stopped");
    }
}

/// Handle to a spawned refresh loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct SchedulerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
    _guard: DropGuard,
}

impl SchedulerHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "Refresh loop task failed");
        }
    }
}
