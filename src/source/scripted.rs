//! In-memory backend for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use sdnwatch_client::{ChartImage, ClientError};
use sdnwatch_types::{
    CommandStatus, MetricsSnapshot, ModeChange, OperatingMode, SavedCharts, TopologySnapshot,
    TrafficStatus,
};

use super::Backend;

#[derive(Debug, Default)]
struct Script {
    metrics: VecDeque<MetricsSnapshot>,
    topology: TopologySnapshot,
    running: bool,
    failing: HashMap<&'static str, u16>,
    calls: HashMap<&'static str, usize>,
    uploads: Vec<ChartImage>,
    modes: Vec<OperatingMode>,
}

/// Answers from canned data. Metrics are served in order; once the queue
/// is empty a default snapshot is returned.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_metrics(&self, snapshot: MetricsSnapshot) {
        self.script.lock().unwrap().metrics.push_back(snapshot);
    }

    pub fn set_topology(&self, topology: TopologySnapshot) {
        self.script.lock().unwrap().topology = topology;
    }

    pub fn set_running(&self, running: bool) {
        self.script.lock().unwrap().running = running;
    }

    /// Make every call to `endpoint` fail with `status`.
    pub fn fail(&self, endpoint: &'static str, status: u16) {
        self.script.lock().unwrap().failing.insert(endpoint, status);
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.script.lock().unwrap().failing.remove(endpoint);
    }

    pub fn calls(&self, endpoint: &'static str) -> usize {
        self.script.lock().unwrap().calls.get(endpoint).copied().unwrap_or(0)
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.script
            .lock()
            .unwrap()
            .uploads
            .iter()
            .map(|c| c.file_name.clone())
            .collect()
    }

    pub fn modes(&self) -> Vec<OperatingMode> {
        self.script.lock().unwrap().modes.clone()
    }

    fn enter(&self, endpoint: &'static str) -> Result<MutexGuard<'_, Script>, ClientError> {
        let mut script = self.script.lock().unwrap();
        *script.calls.entry(endpoint).or_default() += 1;
        if let Some(status) = script.failing.get(endpoint).copied() {
            return Err(ClientError::Status(status));
        }
        Ok(script)
    }
}

fn ok() -> CommandStatus {
    CommandStatus {
        status: Some("ok".to_string()),
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn description(&self) -> &str {
        "scripted"
    }

    async fn metrics(&self) -> Result<MetricsSnapshot, ClientError> {
        let mut script = self.enter("metrics")?;
        Ok(script.metrics.pop_front().unwrap_or_default())
    }

    async fn topology(&self) -> Result<TopologySnapshot, ClientError> {
        Ok(self.enter("topology")?.topology.clone())
    }

    async fn traffic_status(&self) -> Result<TrafficStatus, ClientError> {
        let script = self.enter("traffic-status")?;
        Ok(TrafficStatus {
            running: script.running,
        })
    }

    async fn start_traffic(&self) -> Result<CommandStatus, ClientError> {
        self.enter("start-traffic")?.running = true;
        Ok(ok())
    }

    async fn stop_traffic(&self) -> Result<CommandStatus, ClientError> {
        self.enter("stop")?.running = false;
        Ok(ok())
    }

    async fn congest(&self) -> Result<CommandStatus, ClientError> {
        self.enter("congest")?;
        Ok(ok())
    }

    async fn set_mode(&self, mode: OperatingMode) -> Result<ModeChange, ClientError> {
        self.enter("mode")?.modes.push(mode);
        Ok(ModeChange { mode })
    }

    async fn save_charts(&self, charts: Vec<ChartImage>) -> Result<SavedCharts, ClientError> {
        let mut script = self.enter("save-charts")?;
        let saved = charts
            .iter()
            .map(|c| format!("/srv/charts/{}", c.file_name))
            .collect();
        script.uploads.extend(charts);
        Ok(SavedCharts { saved })
    }
}
