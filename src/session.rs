//! Live dashboard state for one session.
//!
//! Everything the charts and the topology view read lives here: the series
//! windows, the operating mode, the congestion markers, the last backend
//! state and the topology graph. Only the UI thread mutates it, one update
//! at a time, so there is no locking.

use std::collections::BTreeMap;
use std::time::Instant;

use sdnwatch_types::{BackendState, MetricsSnapshot, OperatingMode, PortUtilization, TopologySnapshot};
use tracing::{debug, info};

use crate::data::{
    ChartKind, MarkerOverlay, ModeProjector, SampleSet, SeriesBuffer, StateTracker, TopologyGraph,
    Transition, DEFAULT_WINDOW,
};

/// What applying one metrics poll changed.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsApplied {
    /// State edge observed on this poll, if any.
    pub transition: Option<Transition>,
    /// Ordinal of the marker added for a congestion onset.
    pub marker: Option<u32>,
}

/// Session-scoped live state.
#[derive(Debug)]
pub struct Session {
    buffers: BTreeMap<ChartKind, SeriesBuffer>,
    projector: ModeProjector,
    markers: MarkerOverlay,
    tracker: StateTracker,
    topology: TopologyGraph,
    top_ports: Vec<PortUtilization>,
    reported_mode: Option<String>,
    last_sequence: u64,
    last_update: Option<Instant>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl Session {
    /// Create an empty session whose charts keep `window` points.
    pub fn new(window: usize) -> Self {
        Self {
            buffers: ChartKind::ALL
                .iter()
                .map(|c| (*c, SeriesBuffer::for_chart(*c, window)))
                .collect(),
            projector: ModeProjector::default(),
            markers: MarkerOverlay::new(),
            tracker: StateTracker::new(),
            topology: TopologyGraph::new(),
            top_ports: Vec::new(),
            reported_mode: None,
            last_sequence: 0,
            last_update: None,
        }
    }

    /// Apply the result of poll number `sequence`, labelled `label`.
    ///
    /// Returns `None` and changes nothing when a newer poll has already been
    /// applied.
    pub fn apply_metrics(
        &mut self,
        sequence: u64,
        snapshot: &MetricsSnapshot,
        label: &str,
    ) -> Option<MetricsApplied> {
        if sequence <= self.last_sequence {
            debug!(sequence, last = self.last_sequence, "discarding stale metrics");
            return None;
        }
        self.last_sequence = sequence;

        let set = SampleSet::from_snapshot(snapshot);
        for (chart, buffer) in self.buffers.iter_mut() {
            buffer.append(label, &set.for_chart(*chart));
        }
        self.top_ports = set.top_ports;
        self.reported_mode = set.mode;
        self.last_update = Some(Instant::now());

        let transition = self.tracker.observe(&set.state);
        let marker = match &transition {
            Some(edge) if edge.enters_congestion() => {
                info!(from = %edge.from, to = %edge.to, at = label, "congestion onset");
                Some(self.add_marker(label))
            }
            Some(edge) => {
                info!(from = %edge.from, to = %edge.to, "state change");
                None
            }
            None => None,
        };

        Some(MetricsApplied { transition, marker })
    }

    /// Add a marker at `label` on every chart; returns its ordinal.
    pub fn add_marker(&mut self, label: &str) -> u32 {
        let ranges: Vec<(ChartKind, Option<(f64, f64)>)> =
            ChartKind::ALL.iter().map(|c| (*c, self.visible_range(*c))).collect();
        self.markers.add_marker(label, ranges).ordinal
    }

    /// Add a marker requested from the controls.
    ///
    /// The marker is pinned to the newest label on the time axis so it lands
    /// on the charts even when the request falls between two polls. Before
    /// the first poll `now` is used. Returns the ordinal and the label used.
    pub fn add_explicit_marker(&mut self, now: &str) -> (u32, String) {
        let label = self
            .buffers
            .get(&ChartKind::Throughput)
            .and_then(|b| b.labels().last())
            .unwrap_or(now)
            .to_string();
        (self.add_marker(&label), label)
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    /// Min/max of the series currently visible on `chart`.
    pub fn visible_range(&self, chart: ChartKind) -> Option<(f64, f64)> {
        let buffer = self.buffers.get(&chart)?;
        buffer.value_range(self.projector.visible(chart.series()))
    }

    pub fn apply_topology(&mut self, snapshot: &TopologySnapshot) {
        self.topology.apply(snapshot);
    }

    pub fn set_mode(&mut self, mode: OperatingMode) {
        self.projector.set_mode(mode);
    }

    pub fn mode(&self) -> OperatingMode {
        self.projector.mode()
    }

    pub fn projector(&self) -> &ModeProjector {
        &self.projector
    }

    pub fn buffer(&self, chart: ChartKind) -> Option<&SeriesBuffer> {
        self.buffers.get(&chart)
    }

    pub fn markers(&self) -> &MarkerOverlay {
        &self.markers
    }

    pub fn topology(&self) -> &TopologyGraph {
        &self.topology
    }

    pub fn top_ports(&self) -> &[PortUtilization] {
        &self.top_ports
    }

    /// Latest backend state, `None` before the first poll.
    pub fn state(&self) -> Option<&BackendState> {
        self.tracker.current()
    }

    /// Mode string the backend itself reported on the last poll.
    pub fn reported_mode(&self) -> Option<&str> {
        self.reported_mode.as_deref()
    }

    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }
}
