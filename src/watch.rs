//! Headless watch mode.
//!
//! Polls the metrics endpoint on a fixed period and prints one summary line
//! per poll, plus a line whenever the backend state changes. Optionally
//! exits once the state has been SAFE for a number of consecutive polls,
//! which is how an experiment run is detected as finished.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use sdnwatch_client::ClientError;
use sdnwatch_types::{BackendState, MetricsSnapshot};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::app::now_label;
use crate::record::Recorder;
use crate::source::Backend;

/// How many top ports a poll line lists.
const TOP_PORTS_SHOWN: usize = 3;

/// `[12:00:01] thr=12.34 Mbps state=SAFE top=s1:2:1200kb/s, s2:1:80kb/s`
pub fn format_poll_line(now: &str, snapshot: &MetricsSnapshot) -> String {
    let throughput = snapshot.throughput.unwrap_or(0.0);
    let state = state_of(snapshot);
    let tops: Vec<String> = snapshot
        .top_ports
        .iter()
        .take(TOP_PORTS_SHOWN)
        .map(|p| format!("{}:{}kb/s", p.port, p.rate_bps.unwrap_or(0) / 1000))
        .collect();
    let tops = if tops.is_empty() {
        "none".to_string()
    } else {
        tops.join(", ")
    };
    format!("[{}] thr={:.2} Mbps state={} top={}", now, throughput, state, tops)
}

pub fn format_state_change(from: &BackendState, to: &BackendState, now: &str) -> String {
    format!("--- STATE CHANGE: {} -> {} @ {}", from, to, now)
}

fn state_of(snapshot: &MetricsSnapshot) -> BackendState {
    snapshot
        .state
        .clone()
        .unwrap_or_else(|| BackendState::Other("UNKNOWN".to_string()))
}

/// Counts consecutive SAFE polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeCounter {
    required: u32,
    count: u32,
}

impl SafeCounter {
    pub fn new(required: u32) -> Self {
        Self { required, count: 0 }
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    /// Record one poll; true once the required streak is reached.
    pub fn observe(&mut self, state: &BackendState) -> bool {
        if *state == BackendState::Safe {
            self.count += 1;
        } else {
            self.count = 0;
        }
        self.count >= self.required
    }
}

/// Console reporter for watch mode.
#[derive(Debug)]
pub struct Watcher<W: Write> {
    out: W,
    last_state: Option<BackendState>,
    exit_when_safe: Option<SafeCounter>,
    recorder: Option<Recorder>,
    polls: u64,
}

impl<W: Write> Watcher<W> {
    pub fn new(out: W, exit_when_safe: Option<u32>) -> Self {
        Self {
            out,
            last_state: None,
            exit_when_safe: exit_when_safe.map(SafeCounter::new),
            recorder: None,
            polls: 0,
        }
    }

    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Report one successful poll. Returns true when watching should stop.
    pub fn observe(&mut self, snapshot: &MetricsSnapshot, now: &str) -> Result<bool> {
        self.polls += 1;
        writeln!(self.out, "{}", format_poll_line(now, snapshot))?;

        let state = state_of(snapshot);
        match &self.last_state {
            Some(last) if *last != state => {
                writeln!(self.out, "{}", format_state_change(last, &state, now))?;
                self.last_state = Some(state.clone());
            }
            Some(_) => {}
            None => self.last_state = Some(state.clone()),
        }

        if let Some(recorder) = &mut self.recorder {
            if let Err(e) = recorder.record(snapshot, Utc::now()) {
                warn!(
                    "Recording to {} stopped after {} lines: {:#}",
                    recorder.path().display(),
                    recorder.lines(),
                    e
                );
                self.recorder = None;
            }
        }

        let done = match &mut self.exit_when_safe {
            Some(counter) => counter.observe(&state),
            None => false,
        };
        if let (true, Some(counter)) = (done, &self.exit_when_safe) {
            writeln!(
                self.out,
                "System returned to SAFE for {} polls; assuming run completed.",
                counter.required()
            )?;
        }
        self.out.flush()?;
        Ok(done)
    }

    pub fn report_error(&mut self, now: &str, err: &ClientError) -> Result<()> {
        writeln!(self.out, "[{}] ERROR fetching metrics: {}", now, err)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Poll until the SAFE streak is reached or Ctrl+C is pressed.
///
/// The first poll is issued immediately. Fetch errors are printed and
/// polling continues.
pub async fn run<W: Write>(
    backend: &dyn Backend,
    interval: Duration,
    watcher: &mut Watcher<W>,
) -> Result<()> {
    writeln!(watcher.out, "Starting monitor; polling {}", backend.description())?;
    info!("Watching {} every {:?}", backend.description(), interval);

    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            res = &mut shutdown => {
                res?;
                info!("Interrupted after {} polls", watcher.polls());
                return Ok(());
            }
            _ = ticker.tick() => {
                let now = now_label();
                match backend.metrics().await {
                    Ok(snapshot) => {
                        if watcher.observe(&snapshot, &now)? {
                            info!("SAFE streak reached after {} polls", watcher.polls());
                            return Ok(());
                        }
                    }
                    Err(e) => {
                        warn!("Metrics poll failed: {}", e);
                        watcher.report_error(&now, &e)?;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::scripted::ScriptedBackend;
    use sdnwatch_types::PortUtilization;

    fn snapshot(state: &str) -> MetricsSnapshot {
        MetricsSnapshot {
            throughput: Some(12.345),
            state: Some(BackendState::from(state)),
            ..Default::default()
        }
    }

    fn port(name: &str, rate_bps: Option<u64>) -> PortUtilization {
        PortUtilization {
            port: name.to_string(),
            utilization: 0.5,
            rate_bps,
        }
    }

    #[test]
    fn test_poll_line_format() {
        let mut snap = snapshot("SAFE");
        assert_eq!(
            format_poll_line("12:00:01", &snap),
            "[12:00:01] thr=12.35 Mbps state=SAFE top=none"
        );

        snap.top_ports = vec![
            port("s1:2", Some(1_234_567)),
            port("s2:1", None),
            port("s3:3", Some(999)),
            port("s4:1", Some(5_000)),
        ];
        assert_eq!(
            format_poll_line("12:00:01", &snap),
            "[12:00:01] thr=12.35 Mbps state=SAFE top=s1:2:1234kb/s, s2:1:0kb/s, s3:3:0kb/s"
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let line = format_poll_line("t", &MetricsSnapshot::default());
        assert_eq!(line, "[t] thr=0.00 Mbps state=UNKNOWN top=none");
    }

    #[test]
    fn test_safe_counter_resets() {
        let mut counter = SafeCounter::new(2);
        assert!(!counter.observe(&BackendState::Safe));
        assert!(!counter.observe(&BackendState::Congested));
        assert!(!counter.observe(&BackendState::Safe));
        assert!(counter.observe(&BackendState::Safe));
    }

    #[test]
    fn test_first_observation_is_not_a_change() {
        let mut watcher = Watcher::new(Vec::new(), None);
        assert!(!watcher.observe(&snapshot("CONGESTED"), "t1").unwrap());
        assert!(!watcher.observe(&snapshot("CONGESTED"), "t2").unwrap());
        assert!(!watcher.observe(&snapshot("SAFE"), "t3").unwrap());

        let out = String::from_utf8(watcher.into_inner()).unwrap();
        let changes: Vec<&str> = out.lines().filter(|l| l.starts_with("---")).collect();
        assert_eq!(changes, ["--- STATE CHANGE: CONGESTED -> SAFE @ t3"]);
    }

    #[test]
    fn test_watcher_records_polls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.jsonl");
        let recorder = Recorder::open(&path).unwrap();
        let mut watcher = Watcher::new(Vec::new(), None).with_recorder(recorder);

        watcher.observe(&snapshot("SAFE"), "t1").unwrap();
        watcher.observe(&snapshot("SAFE"), "t2").unwrap();

        let records = crate::record::read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].snapshot.state, Some(BackendState::Safe));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exits_after_safe_streak() {
        let backend = ScriptedBackend::new();
        for state in ["SAFE", "CONGESTED", "SAFE", "SAFE", "SAFE"] {
            backend.push_metrics(snapshot(state));
        }

        let mut watcher = Watcher::new(Vec::new(), Some(3));
        run(&backend, Duration::from_secs(2), &mut watcher).await.unwrap();

        assert_eq!(backend.calls("metrics"), 5);
        let out = String::from_utf8(watcher.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("Starting monitor; polling"));
        assert_eq!(lines.iter().filter(|l| l.contains("thr=12.35 Mbps")).count(), 5);
        assert!(out.contains("--- STATE CHANGE: SAFE -> CONGESTED"));
        assert!(out.contains("--- STATE CHANGE: CONGESTED -> SAFE"));
        assert_eq!(
            lines.last().copied(),
            Some("System returned to SAFE for 3 polls; assuming run completed.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reports_errors_and_continues() {
        let backend = ScriptedBackend::new();
        backend.fail("metrics", 503);

        let mut watcher = Watcher::new(Vec::new(), Some(1));
        let backend = std::sync::Arc::new(backend);
        let task = {
            let backend = backend.clone();
            tokio::spawn(async move {
                run(backend.as_ref(), Duration::from_secs(2), &mut watcher).await.unwrap();
                watcher.into_inner()
            })
        };

        tokio::time::sleep(Duration::from_secs(3)).await;
        backend.recover("metrics");
        backend.push_metrics(snapshot("SAFE"));

        let out = String::from_utf8(task.await.unwrap()).unwrap();
        assert_eq!(out.matches("ERROR fetching metrics").count(), 2);
        assert!(out.contains("state=SAFE"));
    }
}
