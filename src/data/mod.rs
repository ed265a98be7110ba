//! Data models and processing for live metrics.
//!
//! This module turns raw backend payloads into the windowed, mode-aware
//! state the charts are drawn from.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "2s", "500ms")
//! - [`markers`]: Congestion markers pinned to timestamp labels
//! - [`mode`]: Baseline/proposed visibility projection
//! - [`sample`]: Decoding a [`MetricsSnapshot`](sdnwatch_types::MetricsSnapshot) into keyed samples
//! - [`series`]: Fixed-capacity sliding windows ([`SeriesBuffer`])
//! - [`topology`]: Topology graph merge and link styling
//! - [`transition`]: Edge detection on the backend state stream
//!
//! ## Data Flow
//!
//! ```text
//! MetricsSnapshot (raw JSON)
//!        │
//!        ▼
//! SampleSet::from_snapshot()
//!        │
//!        ├──▶ SeriesBuffer::append() per ChartKind
//!        │
//!        └──▶ StateTracker::observe() ──▶ MarkerOverlay::add_marker() on onset
//! ```

pub mod duration;
pub mod markers;
pub mod mode;
pub mod sample;
pub mod series;
pub mod topology;
pub mod transition;

pub use markers::{CongestionMarker, MarkerOverlay, PlacedMarker};
pub use mode::ModeProjector;
pub use sample::SampleSet;
pub use series::{ChartKind, MetricSample, SeriesBuffer, SeriesKey, Variant, DEFAULT_WINDOW};
pub use topology::{EdgeStyle, EdgeView, NodeView, TopologyGraph};
pub use transition::{StateTracker, Transition};
