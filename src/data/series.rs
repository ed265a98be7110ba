//! Sliding windows of live metric samples.
//!
//! Each chart owns one [`SeriesBuffer`]. All series of a chart share the
//! buffer's label axis, so evicting the oldest row drops the label and every
//! series value at that position together.

use std::collections::{BTreeMap, VecDeque};

/// Number of points a chart keeps before evicting the oldest.
pub const DEFAULT_WINDOW: usize = 25;

/// Which side of a baseline/proposed pair a series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Baseline,
    Proposed,
    /// Series without a counterpart (EWMA, flow count).
    Unpaired,
}

/// Every time series the dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKey {
    ThroughputBaseline,
    ThroughputProposed,
    LatencyBaseline,
    LatencyProposed,
    PacketLossBaseline,
    PacketLossProposed,
    Ewma,
    Flows,
}

impl SeriesKey {
    pub const ALL: [SeriesKey; 8] = [
        SeriesKey::ThroughputBaseline,
        SeriesKey::ThroughputProposed,
        SeriesKey::LatencyBaseline,
        SeriesKey::LatencyProposed,
        SeriesKey::PacketLossBaseline,
        SeriesKey::PacketLossProposed,
        SeriesKey::Ewma,
        SeriesKey::Flows,
    ];

    /// The chart this series is drawn on.
    pub fn chart(self) -> ChartKind {
        match self {
            SeriesKey::ThroughputBaseline | SeriesKey::ThroughputProposed => ChartKind::Throughput,
            SeriesKey::LatencyBaseline | SeriesKey::LatencyProposed => ChartKind::Latency,
            SeriesKey::PacketLossBaseline | SeriesKey::PacketLossProposed => ChartKind::PacketLoss,
            SeriesKey::Ewma => ChartKind::Ewma,
            SeriesKey::Flows => ChartKind::Flows,
        }
    }

    pub fn variant(self) -> Variant {
        match self {
            SeriesKey::ThroughputBaseline
            | SeriesKey::LatencyBaseline
            | SeriesKey::PacketLossBaseline => Variant::Baseline,
            SeriesKey::ThroughputProposed
            | SeriesKey::LatencyProposed
            | SeriesKey::PacketLossProposed => Variant::Proposed,
            SeriesKey::Ewma | SeriesKey::Flows => Variant::Unpaired,
        }
    }

    /// Legend text.
    pub fn label(self) -> &'static str {
        match self {
            SeriesKey::ThroughputBaseline => "Baseline Throughput",
            SeriesKey::ThroughputProposed => "Proposed Throughput",
            SeriesKey::LatencyBaseline => "Baseline Latency",
            SeriesKey::LatencyProposed => "Proposed Latency",
            SeriesKey::PacketLossBaseline => "Baseline Packet Loss",
            SeriesKey::PacketLossProposed => "Proposed Packet Loss",
            SeriesKey::Ewma => "EWMA Utilization (%)",
            SeriesKey::Flows => "Flows",
        }
    }
}

/// A time-series view on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartKind {
    Throughput,
    Latency,
    PacketLoss,
    Ewma,
    Flows,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Throughput,
        ChartKind::Latency,
        ChartKind::PacketLoss,
        ChartKind::Ewma,
        ChartKind::Flows,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Throughput => "Throughput",
            ChartKind::Latency => "Latency",
            ChartKind::PacketLoss => "Packet Loss",
            ChartKind::Ewma => "EWMA Utilization",
            ChartKind::Flows => "Flows",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            ChartKind::Throughput => "Mbps",
            ChartKind::Latency => "ms",
            ChartKind::PacketLoss | ChartKind::Ewma => "%",
            ChartKind::Flows => "",
        }
    }

    /// Series drawn on this chart, in legend order.
    pub fn series(self) -> &'static [SeriesKey] {
        match self {
            ChartKind::Throughput => &[SeriesKey::ThroughputBaseline, SeriesKey::ThroughputProposed],
            ChartKind::Latency => &[SeriesKey::LatencyBaseline, SeriesKey::LatencyProposed],
            ChartKind::PacketLoss => &[SeriesKey::PacketLossBaseline, SeriesKey::PacketLossProposed],
            ChartKind::Ewma => &[SeriesKey::Ewma],
            ChartKind::Flows => &[SeriesKey::Flows],
        }
    }
}

/// One scalar reading of one series. Immutable once decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    pub key: SeriesKey,
    pub value: f64,
}

impl MetricSample {
    pub fn new(key: SeriesKey, value: f64) -> Self {
        Self { key, value }
    }
}

/// Bounded FIFO of labelled rows shared by a fixed set of series.
///
/// Invariant: every column has exactly as many values as there are labels,
/// and that count never exceeds the capacity.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    capacity: usize,
    labels: VecDeque<String>,
    columns: BTreeMap<SeriesKey, VecDeque<f64>>,
}

impl SeriesBuffer {
    /// Create an empty buffer for the given series. A capacity of zero is
    /// treated as one.
    pub fn new(capacity: usize, keys: &[SeriesKey]) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            labels: VecDeque::with_capacity(capacity + 1),
            columns: keys
                .iter()
                .map(|k| (*k, VecDeque::with_capacity(capacity + 1)))
                .collect(),
        }
    }

    /// Buffer holding every series of `chart`.
    pub fn for_chart(chart: ChartKind, capacity: usize) -> Self {
        Self::new(capacity, chart.series())
    }

    /// Append one row, evicting the oldest row once over capacity.
    ///
    /// A registered series missing from `samples` takes the row's first
    /// value; samples for unregistered series are ignored.
    pub fn append(&mut self, label: impl Into<String>, samples: &[MetricSample]) {
        let fallback = samples.first().map(|s| s.value).unwrap_or(0.0);

        self.labels.push_back(label.into());
        for (key, column) in self.columns.iter_mut() {
            let value = samples
                .iter()
                .find(|s| s.key == *key)
                .map(|s| s.value)
                .unwrap_or(fallback);
            column.push_back(value);
        }

        if self.labels.len() > self.capacity {
            self.labels.pop_front();
            for column in self.columns.values_mut() {
                column.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Labels oldest first.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.iter().map(String::as_str)
    }

    /// Values of one series oldest first. Empty for unregistered series.
    pub fn values(&self, key: SeriesKey) -> impl Iterator<Item = f64> + '_ {
        self.columns.get(&key).into_iter().flat_map(|c| c.iter().copied())
    }

    pub fn latest(&self, key: SeriesKey) -> Option<f64> {
        self.columns.get(&key)?.back().copied()
    }

    /// Position of the newest row carrying `label`.
    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().rposition(|l| l == label)
    }

    /// Min and max over the given series, `None` while nothing is buffered.
    pub fn value_range(&self, keys: impl IntoIterator<Item = SeriesKey>) -> Option<(f64, f64)> {
        keys.into_iter()
            .flat_map(|k| self.values(k).collect::<Vec<_>>())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throughput_row(baseline: f64, proposed: f64) -> Vec<MetricSample> {
        vec![
            MetricSample::new(SeriesKey::ThroughputBaseline, baseline),
            MetricSample::new(SeriesKey::ThroughputProposed, proposed),
        ]
    }

    #[test]
    fn test_keeps_most_recent_window() {
        let mut buffer = SeriesBuffer::for_chart(ChartKind::Throughput, DEFAULT_WINDOW);
        for i in 0..40 {
            buffer.append(format!("t{}", i), &throughput_row(i as f64, i as f64 * 2.0));
        }

        assert_eq!(buffer.len(), 25);
        let expected: Vec<f64> = (15..40).map(|i| i as f64).collect();
        assert_eq!(buffer.values(SeriesKey::ThroughputBaseline).collect::<Vec<_>>(), expected);
        assert_eq!(buffer.values(SeriesKey::ThroughputProposed).count(), 25);
        assert_eq!(buffer.labels().next(), Some("t15"));
        assert_eq!(buffer.labels().last(), Some("t39"));
    }

    #[test]
    fn test_under_capacity_keeps_everything() {
        let mut buffer = SeriesBuffer::for_chart(ChartKind::Flows, 25);
        for i in 0..5 {
            buffer.append(format!("t{}", i), &[MetricSample::new(SeriesKey::Flows, i as f64)]);
        }
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.latest(SeriesKey::Flows), Some(4.0));
    }

    #[test]
    fn test_missing_series_takes_first_value() {
        let mut buffer = SeriesBuffer::for_chart(ChartKind::Latency, 25);
        buffer.append("t0", &[MetricSample::new(SeriesKey::LatencyBaseline, 21.0)]);
        assert_eq!(buffer.latest(SeriesKey::LatencyProposed), Some(21.0));

        buffer.append("t1", &[]);
        assert_eq!(buffer.latest(SeriesKey::LatencyBaseline), Some(0.0));
        assert_eq!(buffer.values(SeriesKey::LatencyProposed).count(), 2);
    }

    #[test]
    fn test_unregistered_series_ignored() {
        let mut buffer = SeriesBuffer::for_chart(ChartKind::Ewma, 25);
        buffer.append(
            "t0",
            &[
                MetricSample::new(SeriesKey::Ewma, 40.0),
                MetricSample::new(SeriesKey::Flows, 9.0),
            ],
        );
        assert_eq!(buffer.values(SeriesKey::Flows).count(), 0);
        assert_eq!(buffer.latest(SeriesKey::Ewma), Some(40.0));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut buffer = SeriesBuffer::for_chart(ChartKind::Flows, 0);
        buffer.append("a", &[MetricSample::new(SeriesKey::Flows, 1.0)]);
        buffer.append("b", &[MetricSample::new(SeriesKey::Flows, 2.0)]);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.labels().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_value_range_and_position() {
        let mut buffer = SeriesBuffer::for_chart(ChartKind::Throughput, 25);
        assert!(buffer.value_range(ChartKind::Throughput.series().iter().copied()).is_none());

        buffer.append("10:00:00", &throughput_row(5.0, 1.0));
        buffer.append("10:00:02", &throughput_row(9.0, 3.0));

        assert_eq!(
            buffer.value_range([SeriesKey::ThroughputBaseline]),
            Some((5.0, 9.0))
        );
        assert_eq!(
            buffer.value_range(ChartKind::Throughput.series().iter().copied()),
            Some((1.0, 9.0))
        );
        assert_eq!(buffer.position_of("10:00:02"), Some(1));
        assert_eq!(buffer.position_of("09:59:58"), None);
    }

    #[test]
    fn test_key_metadata_consistent() {
        for chart in ChartKind::ALL {
            for key in chart.series() {
                assert_eq!(key.chart(), chart);
            }
        }
        assert_eq!(SeriesKey::Ewma.variant(), Variant::Unpaired);
        assert_eq!(SeriesKey::LatencyProposed.variant(), Variant::Proposed);
    }
}
