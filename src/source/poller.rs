//! The two background schedules: metrics polling and topology refresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::{Backend, Schedule, Update};

/// Polls `/api/metrics` while traffic is running.
///
/// Each request is tagged with a sequence number that keeps increasing
/// across stop/start, so a response that arrives after a newer one can be
/// recognised and dropped.
#[derive(Debug)]
pub struct MetricsPoller {
    schedule: Schedule,
    sequence: Arc<AtomicU64>,
}

impl MetricsPoller {
    pub fn new(period: Duration) -> Self {
        Self {
            schedule: Schedule::new("metrics", period),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start polling. Returns `false` if already running.
    pub fn start(
        &mut self,
        handle: &Handle,
        backend: Arc<dyn Backend>,
        updates: UnboundedSender<Update>,
    ) -> bool {
        let sequence = self.sequence.clone();
        self.schedule.start(handle, move || {
            let backend = backend.clone();
            let updates = updates.clone();
            let sequence = sequence.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                let result = backend.metrics().await;
                debug!(sequence, ok = result.is_ok(), "metrics poll finished");
                updates.send(Update::Metrics { sequence, result }).is_ok()
            }
        })
    }

    /// Stop polling. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        self.schedule.stop()
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_running()
    }

    pub fn period(&self) -> Duration {
        self.schedule.period()
    }

    /// Number of polls issued so far.
    pub fn issued(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

/// Refreshes `/api/topology` for the whole session.
#[derive(Debug)]
pub struct TopologyRefresher {
    schedule: Schedule,
}

impl TopologyRefresher {
    pub fn new(period: Duration) -> Self {
        Self {
            schedule: Schedule::new("topology", period),
        }
    }

    pub fn start(
        &mut self,
        handle: &Handle,
        backend: Arc<dyn Backend>,
        updates: UnboundedSender<Update>,
    ) -> bool {
        self.schedule.start(handle, move || {
            let backend = backend.clone();
            let updates = updates.clone();
            async move { updates.send(Update::Topology(backend.topology().await)).is_ok() }
        })
    }

    /// One refresh outside the schedule.
    pub fn refresh_now(
        &self,
        handle: &Handle,
        backend: Arc<dyn Backend>,
        updates: UnboundedSender<Update>,
    ) {
        handle.spawn(async move {
            let _ = updates.send(Update::Topology(backend.topology().await));
        });
    }

    pub fn stop(&mut self) -> bool {
        self.schedule.stop()
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_running()
    }
}
