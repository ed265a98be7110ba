//! Congestion markers overlaid on the time-series charts.
//!
//! A marker is pinned to a timestamp label, not to a buffer index, so it
//! stays on the right sample while the window slides underneath it. Once its
//! label has been evicted from a chart the marker is simply not drawn there.

use std::collections::BTreeMap;

use super::series::{ChartKind, SeriesBuffer};

/// Span used when a chart had no data at the time the marker was placed.
pub const FALLBACK_SPAN: (f64, f64) = (0.0, 1.0);

/// One congestion annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct CongestionMarker {
    pub ordinal: u32,
    /// Timestamp label the marker is aligned to.
    pub at: String,
    /// Vertical extent per chart, captured when the marker was added.
    pub spans: BTreeMap<ChartKind, (f64, f64)>,
}

impl CongestionMarker {
    /// Legend text, e.g. `CONGEST 3`.
    pub fn label(&self) -> String {
        format!("CONGEST {}", self.ordinal)
    }

    pub fn span(&self, chart: ChartKind) -> (f64, f64) {
        self.spans.get(&chart).copied().unwrap_or(FALLBACK_SPAN)
    }
}

/// Where a marker lands on one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker<'a> {
    pub marker: &'a CongestionMarker,
    /// Buffer position of the marker's label.
    pub x: usize,
    pub low: f64,
    pub high: f64,
}

/// Growing list of markers with a monotonically increasing ordinal.
#[derive(Debug, Clone, Default)]
pub struct MarkerOverlay {
    markers: Vec<CongestionMarker>,
    ordinal: u32,
}

impl MarkerOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marker at `at`, spanning each chart's current visible range.
    ///
    /// Charts whose range is `None` (no data yet) get [`FALLBACK_SPAN`].
    pub fn add_marker(
        &mut self,
        at: impl Into<String>,
        ranges: impl IntoIterator<Item = (ChartKind, Option<(f64, f64)>)>,
    ) -> &CongestionMarker {
        self.ordinal += 1;
        let spans = ranges
            .into_iter()
            .map(|(chart, range)| (chart, range.unwrap_or(FALLBACK_SPAN)))
            .collect();
        self.markers.push(CongestionMarker {
            ordinal: self.ordinal,
            at: at.into(),
            spans,
        });
        &self.markers[self.markers.len() - 1]
    }

    /// Drop every marker and restart numbering.
    pub fn clear(&mut self) {
        self.markers.clear();
        self.ordinal = 0;
    }

    /// Ordinal of the most recent marker, 0 when none.
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn markers(&self) -> &[CongestionMarker] {
        &self.markers
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Markers whose label is still inside `buffer`'s window.
    pub fn placed<'a>(&'a self, chart: ChartKind, buffer: &SeriesBuffer) -> Vec<PlacedMarker<'a>> {
        self.markers
            .iter()
            .filter_map(|marker| {
                let x = buffer.position_of(&marker.at)?;
                let (low, high) = marker.span(chart);
                Some(PlacedMarker {
                    marker,
                    x,
                    low,
                    high,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::{MetricSample, SeriesKey};

    fn ranges(range: Option<(f64, f64)>) -> Vec<(ChartKind, Option<(f64, f64)>)> {
        ChartKind::ALL.iter().map(|c| (*c, range)).collect()
    }

    #[test]
    fn test_ordinal_increments_by_one() {
        let mut overlay = MarkerOverlay::new();
        for expected in 1..=4 {
            let marker = overlay.add_marker(format!("10:00:0{}", expected), ranges(None));
            assert_eq!(marker.ordinal, expected);
            assert_eq!(marker.label(), format!("CONGEST {}", expected));
        }
        assert_eq!(overlay.ordinal(), 4);
        assert_eq!(overlay.markers().len(), 4);
    }

    #[test]
    fn test_clear_resets_ordinal() {
        let mut overlay = MarkerOverlay::new();
        overlay.add_marker("a", ranges(None));
        overlay.add_marker("b", ranges(None));
        overlay.clear();
        assert_eq!(overlay.ordinal(), 0);
        assert!(overlay.is_empty());

        let marker = overlay.add_marker("c", ranges(None));
        assert_eq!(marker.ordinal, 1);
    }

    #[test]
    fn test_fallback_span_without_data() {
        let mut overlay = MarkerOverlay::new();
        let marker = overlay.add_marker("10:00:00", ranges(None));
        assert_eq!(marker.span(ChartKind::Latency), FALLBACK_SPAN);

        let marker = overlay.add_marker("10:00:02", ranges(Some((3.0, 9.0))));
        assert_eq!(marker.span(ChartKind::Latency), (3.0, 9.0));
    }

    #[test]
    fn test_placed_by_label_not_index() {
        let mut buffer = SeriesBuffer::for_chart(ChartKind::Flows, 3);
        for (i, label) in ["a", "b", "c"].iter().enumerate() {
            buffer.append(*label, &[MetricSample::new(SeriesKey::Flows, i as f64)]);
        }

        let mut overlay = MarkerOverlay::new();
        overlay.add_marker("b", ranges(Some((0.0, 2.0))));
        overlay.add_marker("zz", ranges(None));

        let placed = overlay.placed(ChartKind::Flows, &buffer);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].x, 1);

        // Window slides: "b" moves to position 0, then falls out
        buffer.append("d", &[MetricSample::new(SeriesKey::Flows, 3.0)]);
        assert_eq!(overlay.placed(ChartKind::Flows, &buffer)[0].x, 0);
        buffer.append("e", &[MetricSample::new(SeriesKey::Flows, 4.0)]);
        assert!(overlay.placed(ChartKind::Flows, &buffer).is_empty());
        assert_eq!(overlay.markers().len(), 2);
    }
}
