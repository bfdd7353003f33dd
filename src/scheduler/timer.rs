//! Cancellable repeating timers on top of tokio.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Work run on every firing.
pub type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Scheduling primitive provided by the host.
pub trait Timer: Send + Sync {
    /// Run `job` once after `delay` ticks, then every `period` ticks until
    /// the returned handle is cancelled or dropped.
    fn run_timer(&self, job: Job, delay: u64, period: u64) -> TaskHandle;
}

/// Handle to a repeating job.
///
/// Cancelling stops future firings. A firing already in progress runs
/// to completion.
#[derive(Debug)]
pub struct TaskHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// The job loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Timer driven by the tokio clock, with a fixed wall-clock tick length.
#[derive(Debug, Clone)]
pub struct TokioTimer {
    tick: Duration,
}

impl TokioTimer {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    fn ticks(&self, n: u64) -> Duration {
        self.tick
            .saturating_mul(u32::try_from(n).unwrap_or(u32::MAX))
    }
}

impl Timer for TokioTimer {
    fn run_timer(&self, job: Job, delay: u64, period: u64) -> TaskHandle {
        let (cancel, mut cancelled) = watch::channel(false);
        let start = Instant::now() + self.ticks(delay);
        let period = self.ticks(period.max(1));

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // Fires on cancel and when the handle is gone
                    _ = cancelled.changed() => break,
                    _ = ticker.tick() => {}
                }
                if *cancelled.borrow() {
                    break;
                }
                // Outside the select so cancellation never interrupts a run
                job().await;
            }
        });

        TaskHandle { cancel, task }
    }
}
