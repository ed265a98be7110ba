//! Cancellable fixed-period task.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A job run every `period` on the tokio runtime, at most one instance at a
/// time.
///
/// The first run happens one full period after [`start`](Schedule::start).
/// Runs are serial: a slow job delays the following tick rather than
/// overlapping with it.
#[derive(Debug)]
pub struct Schedule {
    name: &'static str,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl Schedule {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period: period.max(MIN_PERIOD),
            task: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start running `job` on `handle`. Returns `false` (and does nothing)
    /// if already running.
    ///
    /// The job resolves to `false` to end the schedule, typically because
    /// the consumer of its results has gone away.
    pub fn start<F, Fut>(&mut self, handle: &Handle, mut job: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        if self.is_running() {
            debug!(schedule = self.name, "already running");
            return false;
        }

        let name = self.name;
        let period = self.period;
        let task = handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !job().await {
                    debug!(schedule = name, "consumer gone, ending schedule");
                    break;
                }
            }
        });

        info!(schedule = self.name, period_ms = period.as_millis() as u64, "schedule started");
        self.task = Some(task);
        true
    }

    /// Cancel the task. Returns `false` if it was not running.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                let was_running = !task.is_finished();
                task.abort();
                if was_running {
                    info!(schedule = self.name, "schedule stopped");
                }
                was_running
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Schedule {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
