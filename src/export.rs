//! PNG rendering of the time-series charts for `/api/save-charts`.
//!
//! [`plot`] turns a chart into a [`ChartPlot`]: the caption, the x-axis labels
//! and one labelled line per visible series or placed congestion marker.
//! [`render_chart`] draws that plot with plotters into an RGB buffer, which
//! is then PNG-encoded in memory.

use std::fmt::Display;
use std::io::Cursor;

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::prelude::*;
use sdnwatch_client::ChartImage;
use tracing::warn;

use crate::data::ChartKind;
use crate::session::Session;
use crate::ui::theme::series_rgb;

/// Charts uploaded on export, with the file name the backend stores them as.
pub const EXPORTED_CHARTS: [(ChartKind, &str); 4] = [
    (ChartKind::Throughput, "throughput.png"),
    (ChartKind::Latency, "latency.png"),
    (ChartKind::PacketLoss, "packet_loss.png"),
    (ChartKind::Ewma, "ewma.png"),
];

pub const DEFAULT_SIZE: (u32, u32) = (800, 400);

const BACKGROUND: RGBColor = RGBColor(7, 32, 39);
const AXIS: RGBColor = RGBColor(120, 144, 156);
const TEXT: RGBColor = RGBColor(207, 216, 220);
const MARKER: RGBColor = RGBColor(255, 77, 77);

// Below this nothing but the background is drawn; below the text size the
// caption, tick labels and legend are left out.
const MIN_CANVAS: (u32, u32) = (32, 32);
const MIN_TEXT_CANVAS: (u32, u32) = (160, 100);

/// One line on an exported chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLine {
    /// Legend entry.
    pub label: String,
    pub color: [u8; 3],
    pub points: Vec<(f64, f64)>,
}

/// Everything needed to draw one chart, independent of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlot {
    pub caption: String,
    /// Buffer label per x index.
    pub labels: Vec<String>,
    pub y_range: (f64, f64),
    /// Visible series first, then markers in ordinal order.
    pub lines: Vec<PlotLine>,
}

impl ChartPlot {
    fn x_range(&self) -> std::ops::Range<f64> {
        0.0..self.labels.len().saturating_sub(1).max(1) as f64
    }

    fn x_label(&self, x: f64) -> String {
        let index = x.round();
        if index < 0.0 || (x - index).abs() > 1e-6 {
            return String::new();
        }
        self.labels.get(index as usize).cloned().unwrap_or_default()
    }
}

/// Caption shown above an exported chart.
pub fn chart_caption(chart: ChartKind) -> String {
    match chart.unit() {
        "" => chart.title().to_string(),
        unit => format!("{} ({})", chart.title(), unit),
    }
}

/// Build the plot for `chart` as the session currently shows it.
pub fn plot(session: &Session, chart: ChartKind) -> ChartPlot {
    let caption = chart_caption(chart);
    let Some(buffer) = session.buffer(chart) else {
        return ChartPlot {
            caption,
            labels: Vec::new(),
            y_range: y_bounds(None, std::iter::empty()),
            lines: Vec::new(),
        };
    };

    let visible: Vec<_> = session.projector().visible(chart.series()).collect();
    let placed = session.markers().placed(chart, buffer);
    let y_range = y_bounds(
        buffer.value_range(visible.iter().copied()),
        placed.iter().map(|p| (p.low, p.high)),
    );

    let series = visible.into_iter().map(|key| PlotLine {
        label: key.label().to_string(),
        color: series_rgb(key),
        points: buffer.values(key).enumerate().map(|(i, v)| (i as f64, v)).collect(),
    });
    let markers = placed.iter().map(|p| PlotLine {
        label: p.marker.label(),
        color: rgb(MARKER),
        points: vec![(p.x as f64, p.low), (p.x as f64, p.high)],
    });

    ChartPlot {
        caption,
        labels: buffer.labels().map(str::to_string).collect(),
        y_range,
        lines: series.chain(markers).collect(),
    }
}

/// Render and encode every exported chart.
pub fn export_charts(session: &Session, width: u32, height: u32) -> Result<Vec<ChartImage>> {
    EXPORTED_CHARTS
        .iter()
        .map(|(chart, file_name)| {
            let image = render_chart(session, *chart, width, height)
                .with_context(|| format!("Failed to draw {}", file_name))?;
            let png = encode_png(image).with_context(|| format!("Failed to encode {}", file_name))?;
            Ok(ChartImage {
                file_name: file_name.to_string(),
                png,
            })
        })
        .collect()
}

pub fn encode_png(image: RgbImage) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image).write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Draw `chart` into a `width` x `height` image.
///
/// Falls back to a chart without text when the font cannot be loaded.
pub fn render_chart(session: &Session, chart: ChartKind, width: u32, height: u32) -> Result<RgbImage> {
    let (width, height) = (width.max(1), height.max(1));
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    let plot = plot(session, chart);

    if width < MIN_CANVAS.0 || height < MIN_CANVAS.1 {
        fill_background(&mut pixels, (width, height))?;
    } else {
        let with_text = width >= MIN_TEXT_CANVAS.0 && height >= MIN_TEXT_CANVAS.1;
        if let Err(e) = draw(&plot, &mut pixels, (width, height), with_text) {
            if !with_text {
                return Err(e);
            }
            warn!(chart = chart.title(), error = %e, "drawing chart text failed, exporting without it");
            draw(&plot, &mut pixels, (width, height), false)?;
        }
    }

    RgbImage::from_raw(width, height, pixels).ok_or_else(|| anyhow!("image buffer size mismatch"))
}

fn fill_background(pixels: &mut [u8], size: (u32, u32)) -> Result<()> {
    let root = BitMapBackend::with_buffer(pixels, size).into_drawing_area();
    root.fill(&BACKGROUND).map_err(draw_error)?;
    root.present().map_err(draw_error)
}

fn draw(plot: &ChartPlot, pixels: &mut [u8], size: (u32, u32), with_text: bool) -> Result<()> {
    let root = BitMapBackend::with_buffer(pixels, size).into_drawing_area();
    root.fill(&BACKGROUND).map_err(draw_error)?;

    let (low, high) = plot.y_range;
    let mut builder = ChartBuilder::on(&root);
    builder.margin(8);
    if with_text {
        builder
            .caption(&plot.caption, ("sans-serif", 16, &TEXT))
            .x_label_area_size(24)
            .y_label_area_size(48);
    } else {
        builder.x_label_area_size(1).y_label_area_size(1);
    }
    let mut chart = builder
        .build_cartesian_2d(plot.x_range(), low..high)
        .map_err(draw_error)?;

    let x_label = |x: &f64| plot.x_label(*x);
    let (x_labels, y_labels) = if with_text {
        (plot.labels.len().clamp(1, 5), 4)
    } else {
        (0, 0)
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(x_labels)
        .y_labels(y_labels)
        .axis_style(AXIS)
        .label_style(("sans-serif", 12, &TEXT))
        .x_label_formatter(&x_label)
        .y_label_formatter(&|y| format!("{:.1}", y))
        .draw()
        .map_err(draw_error)?;

    for line in &plot.lines {
        let [r, g, b] = line.color;
        let color = RGBColor(r, g, b);
        chart
            .draw_series(LineSeries::new(
                line.points.iter().copied(),
                ShapeStyle::from(&color).stroke_width(2),
            ))
            .map_err(draw_error)?
            .label(line.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], ShapeStyle::from(&color).stroke_width(2))
            });
    }

    if with_text && !plot.lines.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&BACKGROUND.mix(0.8))
            .border_style(&AXIS)
            .label_font(("sans-serif", 12, &TEXT))
            .draw()
            .map_err(draw_error)?;
    }

    root.present().map_err(draw_error)
}

fn rgb(color: RGBColor) -> [u8; 3] {
    [color.0, color.1, color.2]
}

fn draw_error(e: impl Display) -> anyhow::Error {
    anyhow!("chart drawing failed: {}", e)
}

/// Value range covering the data and every marker span.
pub fn y_bounds(data: Option<(f64, f64)>, spans: impl Iterator<Item = (f64, f64)>) -> (f64, f64) {
    let (low, high) = spans.fold(data.unwrap_or((f64::INFINITY, f64::NEG_INFINITY)), |acc, s| {
        (acc.0.min(s.0), acc.1.max(s.1))
    });
    if !low.is_finite() || !high.is_finite() {
        return (0.0, 1.0);
    }
    if high - low < f64::EPSILON {
        return (low - 0.5, high + 0.5);
    }
    (low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SeriesKey;
    use image::Rgb;
    use sdnwatch_types::{BackendState, MetricsSnapshot};

    fn session_with_data() -> Session {
        let mut session = Session::default();
        for (seq, (thr, state)) in [(10.0, "SAFE"), (40.0, "SAFE"), (90.0, "CONGESTED")]
            .into_iter()
            .enumerate()
        {
            let snapshot = MetricsSnapshot {
                throughput_baseline: Some(thr),
                latency_baseline: Some(thr / 2.0),
                state: Some(BackendState::from(state)),
                ..Default::default()
            };
            session.apply_metrics(seq as u64 + 1, &snapshot, &format!("t{}", seq));
        }
        session
    }

    #[test]
    fn test_export_produces_decodable_pngs() {
        let session = session_with_data();
        let charts = export_charts(&session, 320, 160).unwrap();

        let names: Vec<_> = charts.iter().map(|c| c.file_name.as_str()).collect();
        assert_eq!(names, ["throughput.png", "latency.png", "packet_loss.png", "ewma.png"]);

        for chart in &charts {
            let decoded = image::load_from_memory(&chart.png).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (320, 160));
        }
    }

    #[test]
    fn test_plot_has_caption_and_legend_entries() {
        let session = session_with_data();
        let plot = plot(&session, ChartKind::Throughput);

        assert_eq!(plot.caption, "Throughput (Mbps)");
        assert_eq!(plot.labels, ["t0", "t1", "t2"]);
        let legend: Vec<_> = plot.lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(legend, ["Baseline Throughput", "CONGEST 1"]);

        let marker = &plot.lines[1];
        assert_eq!(marker.points.len(), 2);
        assert_eq!(marker.points[0].0, 2.0);
        assert_eq!(marker.points[1].0, 2.0);
    }

    #[test]
    fn test_caption_without_unit() {
        assert_eq!(chart_caption(ChartKind::Flows), "Flows");
        assert_eq!(chart_caption(ChartKind::Ewma), "EWMA Utilization (%)");
    }

    #[test]
    fn test_x_labels_only_on_whole_indices() {
        let plot = plot(&session_with_data(), ChartKind::Latency);
        assert_eq!(plot.x_label(1.0), "t1");
        assert_eq!(plot.x_label(0.5), "");
        assert_eq!(plot.x_label(7.0), "");
    }

    #[test]
    fn test_series_and_marker_are_drawn() {
        let session = session_with_data();
        assert_eq!(session.markers().markers().len(), 1);

        let image = render_chart(&session, ChartKind::Throughput, 240, 160).unwrap();
        let series = Rgb(series_rgb(SeriesKey::ThroughputBaseline));
        assert!(image.pixels().any(|p| *p == series));
        assert!(image.pixels().any(|p| *p == Rgb(rgb(MARKER))));

        // Proposed series is hidden in baseline mode
        let hidden = Rgb(series_rgb(SeriesKey::ThroughputProposed));
        assert!(!image.pixels().any(|p| *p == hidden));
    }

    #[test]
    fn test_empty_session_renders_axes_only() {
        let session = Session::default();
        assert!(plot(&session, ChartKind::Ewma).lines.is_empty());

        let image = render_chart(&session, ChartKind::Ewma, 240, 160).unwrap();
        assert!(image.pixels().any(|p| *p == Rgb(rgb(AXIS))));
        assert!(!image.pixels().any(|p| *p == Rgb(rgb(MARKER))));
    }

    #[test]
    fn test_y_bounds() {
        assert_eq!(y_bounds(None, std::iter::empty()), (0.0, 1.0));
        assert_eq!(y_bounds(Some((5.0, 5.0)), std::iter::empty()), (4.5, 5.5));
        assert_eq!(y_bounds(Some((2.0, 8.0)), [(0.0, 10.0)].into_iter()), (0.0, 10.0));
    }

    #[test]
    fn test_tiny_canvas_does_not_panic() {
        let session = session_with_data();
        let image = render_chart(&session, ChartKind::Latency, 1, 1).unwrap();
        assert_eq!(image.dimensions(), (1, 1));
        assert_eq!(*image.get_pixel(0, 0), Rgb(rgb(BACKGROUND)));

        let image = render_chart(&session, ChartKind::Latency, 100, 60).unwrap();
        assert_eq!(image.dimensions(), (100, 60));
    }
}
