//! Backend abstraction and the periodic fetchers that feed the UI.
//!
//! Fetches run as tasks on the tokio runtime and report back through an
//! unbounded channel of [`Update`]s. The UI thread drains that channel and
//! is the only place live state is mutated.

mod poller;
mod schedule;
mod update;

#[cfg(test)]
pub(crate) mod scripted;

pub use poller::{MetricsPoller, TopologyRefresher};
pub use schedule::Schedule;
pub use update::Update;

use std::fmt::Debug;

use async_trait::async_trait;
use sdnwatch_client::{BackendClient, ChartImage, ClientError};
use sdnwatch_types::{
    CommandStatus, MetricsSnapshot, ModeChange, OperatingMode, SavedCharts, TopologySnapshot,
    TrafficStatus,
};

/// The dashboard backend as the application sees it.
///
/// [`BackendClient`] is the real implementation; tests substitute a
/// scripted one.
///
/// # Example
///
/// ```no_run
/// use sdnwatch::Backend;
/// use sdnwatch_client::BackendClient;
///
/// # tokio_test::block_on(async {
/// let client = BackendClient::builder().endpoint("http://127.0.0.1:5000").build().unwrap();
/// let snapshot = client.metrics().await.unwrap();
/// println!("{} reports {:?}", Backend::description(&client), snapshot.state);
/// # });
/// ```
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// Human-readable description for the status bar.
    fn description(&self) -> &str;

    async fn metrics(&self) -> Result<MetricsSnapshot, ClientError>;
    async fn topology(&self) -> Result<TopologySnapshot, ClientError>;
    async fn traffic_status(&self) -> Result<TrafficStatus, ClientError>;
    async fn start_traffic(&self) -> Result<CommandStatus, ClientError>;
    async fn stop_traffic(&self) -> Result<CommandStatus, ClientError>;
    async fn congest(&self) -> Result<CommandStatus, ClientError>;
    async fn set_mode(&self, mode: OperatingMode) -> Result<ModeChange, ClientError>;
    async fn save_charts(&self, charts: Vec<ChartImage>) -> Result<SavedCharts, ClientError>;
}

#[async_trait]
impl Backend for BackendClient {
    fn description(&self) -> &str {
        self.endpoint()
    }

    async fn metrics(&self) -> Result<MetricsSnapshot, ClientError> {
        BackendClient::metrics(self).await
    }

    async fn topology(&self) -> Result<TopologySnapshot, ClientError> {
        BackendClient::topology(self).await
    }

    async fn traffic_status(&self) -> Result<TrafficStatus, ClientError> {
        BackendClient::traffic_status(self).await
    }

    async fn start_traffic(&self) -> Result<CommandStatus, ClientError> {
        BackendClient::start_traffic(self).await
    }

    async fn stop_traffic(&self) -> Result<CommandStatus, ClientError> {
        BackendClient::stop_traffic(self).await
    }

    async fn congest(&self) -> Result<CommandStatus, ClientError> {
        BackendClient::congest(self).await
    }

    async fn set_mode(&self, mode: OperatingMode) -> Result<ModeChange, ClientError> {
        BackendClient::set_mode(self, mode).await
    }

    async fn save_charts(&self, charts: Vec<ChartImage>) -> Result<SavedCharts, ClientError> {
        BackendClient::save_charts(self, charts).await
    }
}
