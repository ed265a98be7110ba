//! Metrics snapshot returned by `GET /api/metrics`.

use crate::BackendState;

#[cfg(feature = "serde")]
use crate::de::{lenient, lenient_count, lenient_or_default};

/// One poll's worth of live metrics.
///
/// Throughput is in Mbps, latency in milliseconds, packet loss in percent.
/// The backend reports the baseline and proposed variant of each metric in
/// parallel so both can be compared on the same axis.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MetricsSnapshot {
    /// Aggregate measured throughput.
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")
    )]
    pub throughput: Option<f64>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient"))]
    pub throughput_baseline: Option<f64>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient"))]
    pub throughput_proposed: Option<f64>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient"))]
    pub latency_baseline: Option<f64>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient"))]
    pub latency_proposed: Option<f64>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient"))]
    pub packet_loss_baseline: Option<f64>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient"))]
    pub packet_loss_proposed: Option<f64>,

    /// EWMA utilization as a fraction of link capacity.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient"))]
    pub ewma: Option<f64>,
    /// EWMA utilization already scaled to percent.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient"))]
    pub ewma_percent: Option<f64>,

    /// Number of installed flow rules.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient_count"))]
    pub flows: Option<u64>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient_or_default"))]
    pub top_ports: Vec<PortUtilization>,

    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient"))]
    pub state: Option<BackendState>,
    /// Mode as the backend reports it. Kept as a string because experiment
    /// runs may use modes the dashboard cannot switch to.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient"))]
    pub mode: Option<String>,

    /// True while the backend samples throughput after a reroute.
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")
    )]
    pub measuring_reroute: Option<bool>,
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")
    )]
    pub proposed_samples: Option<u64>,
    /// Unix time (seconds) of the last reroute notification.
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "lenient", skip_serializing_if = "Option::is_none")
    )]
    pub reroute_since: Option<f64>,
}

impl MetricsSnapshot {
    /// EWMA in percent, preferring the pre-scaled field.
    pub fn ewma_percent_or_scaled(&self) -> Option<f64> {
        self.ewma_percent.or_else(|| self.ewma.map(|e| e * 100.0))
    }
}

/// Utilization of one switch port, as listed in `top_ports`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortUtilization {
    /// `device:port` key, e.g. `of:0000000000000001:2`.
    pub port: String,
    /// Fraction of the assumed link capacity.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "lenient_or_default"))]
    pub utilization: f64,
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            deserialize_with = "lenient_count",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub rate_bps: Option<u64>,
}
