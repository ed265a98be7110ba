//! Decoding a metrics snapshot into keyed samples.
//!
//! This is where missing fields get their defaults: an absent flow count is
//! zero, an absent proposed variant mirrors the baseline, an absent EWMA
//! percent is derived from the fractional EWMA.

use sdnwatch_types::{BackendState, MetricsSnapshot, PortUtilization};

use super::series::{ChartKind, MetricSample, SeriesKey};

/// State placeholder for snapshots that carry no `state` field.
pub const UNKNOWN_STATE: &str = "UNKNOWN";

/// Everything one poll contributes to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    pub samples: Vec<MetricSample>,
    pub state: BackendState,
    pub mode: Option<String>,
    pub top_ports: Vec<PortUtilization>,
}

impl SampleSet {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        let throughput = snapshot.throughput_baseline.unwrap_or(0.0);
        let latency = snapshot.latency_baseline.unwrap_or(0.0);
        let loss = snapshot.packet_loss_baseline.unwrap_or(0.0);

        let samples = vec![
            MetricSample::new(SeriesKey::ThroughputBaseline, throughput),
            MetricSample::new(
                SeriesKey::ThroughputProposed,
                snapshot.throughput_proposed.unwrap_or(throughput),
            ),
            MetricSample::new(SeriesKey::LatencyBaseline, latency),
            MetricSample::new(
                SeriesKey::LatencyProposed,
                snapshot.latency_proposed.unwrap_or(latency),
            ),
            MetricSample::new(SeriesKey::PacketLossBaseline, loss),
            MetricSample::new(
                SeriesKey::PacketLossProposed,
                snapshot.packet_loss_proposed.unwrap_or(loss),
            ),
            MetricSample::new(
                SeriesKey::Ewma,
                snapshot.ewma_percent_or_scaled().unwrap_or(0.0),
            ),
            MetricSample::new(SeriesKey::Flows, snapshot.flows.unwrap_or(0) as f64),
        ];

        Self {
            samples,
            state: snapshot
                .state
                .clone()
                .unwrap_or_else(|| BackendState::Other(UNKNOWN_STATE.to_string())),
            mode: snapshot.mode.clone(),
            top_ports: snapshot.top_ports.clone(),
        }
    }

    /// Samples belonging to one chart.
    pub fn for_chart(&self, chart: ChartKind) -> Vec<MetricSample> {
        self.samples.iter().filter(|s| s.key.chart() == chart).copied().collect()
    }

    pub fn value(&self, key: SeriesKey) -> Option<f64> {
        self.samples.iter().find(|s| s.key == key).map(|s| s.value)
    }
}
