//! Charts view: the five time-series charts and the top ports bar chart.
//!
//! Only the series visible in the current mode are drawn. Each congestion
//! marker whose label is still inside a chart's window is drawn as a
//! two-point vertical line at that label.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{ChartKind, SeriesKey};
use crate::export::y_bounds;

/// Render the charts view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    let top = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(rows[0]);
    let bottom = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(rows[1]);

    render_series_chart(frame, app, ChartKind::Throughput, top[0]);
    render_series_chart(frame, app, ChartKind::Latency, top[1]);
    render_series_chart(frame, app, ChartKind::PacketLoss, top[2]);
    render_series_chart(frame, app, ChartKind::Ewma, bottom[0]);
    render_series_chart(frame, app, ChartKind::Flows, bottom[1]);
    render_top_ports(frame, app, bottom[2]);
}

fn chart_block(app: &App, title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn chart_title(chart: ChartKind) -> String {
    match chart.unit() {
        "" => format!(" {} ", chart.title()),
        unit => format!(" {} ({}) ", chart.title(), unit),
    }
}

/// Point list of one series, x being the position in the window.
fn points(values: impl Iterator<Item = f64>) -> Vec<(f64, f64)> {
    values.enumerate().map(|(i, v)| (i as f64, v)).collect()
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 100.0 || value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn render_series_chart(frame: &mut Frame, app: &App, chart: ChartKind, area: Rect) {
    let block = chart_block(app, chart_title(chart));
    let Some(buffer) = app.session.buffer(chart).filter(|b| !b.is_empty()) else {
        let paragraph = Paragraph::new("No data")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let visible: Vec<SeriesKey> = app.session.projector().visible(chart.series()).collect();
    let series: Vec<(SeriesKey, Vec<(f64, f64)>)> = visible
        .iter()
        .map(|key| (*key, points(buffer.values(*key))))
        .collect();

    let placed = app.session.markers().placed(chart, buffer);
    let markers: Vec<(String, [(f64, f64); 2])> = placed
        .iter()
        .map(|p| (p.marker.label(), [(p.x as f64, p.low), (p.x as f64, p.high)]))
        .collect();

    let mut datasets: Vec<Dataset> = series
        .iter()
        .map(|(key, data)| {
            Dataset::default()
                .name(key.label())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(*key)))
                .data(data)
        })
        .collect();
    datasets.extend(markers.iter().map(|(label, data)| {
        Dataset::default()
            .name(label.clone())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.marker))
            .data(data)
    }));

    let (low, high) = y_bounds(
        buffer.value_range(visible.iter().copied()),
        placed.iter().map(|p| (p.low, p.high)),
    );
    let pad = (high - low) * 0.1;
    let (low, high) = (low - pad, high + pad);

    let labels: Vec<&str> = buffer.labels().collect();
    let x_labels = match (labels.first(), labels.last()) {
        (Some(first), Some(last)) if labels.len() > 1 => {
            vec![Span::raw(first.to_string()), Span::raw(last.to_string())]
        }
        (Some(only), _) => vec![Span::raw(only.to_string())],
        _ => Vec::new(),
    };
    let y_labels = vec![
        Span::raw(format_tick(low)),
        Span::raw(format_tick((low + high) / 2.0)),
        Span::raw(format_tick(high)),
    ];

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, (buffer.len().saturating_sub(1)).max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([low, high])
                .labels(y_labels),
        );
    frame.render_widget(widget, area);
}

/// Port key shortened to what fits under a bar.
fn short_port(port: &str, width: usize) -> String {
    let chars: Vec<char> = port.chars().collect();
    if chars.len() <= width {
        port.to_string()
    } else {
        chars[chars.len() - width..].iter().collect()
    }
}

fn render_top_ports(frame: &mut Frame, app: &App, area: Rect) {
    let block = chart_block(app, " Top Ports Utilization (%) ".to_string());
    let ports = app.session.top_ports();
    if ports.is_empty() {
        let paragraph = Paragraph::new("No port data")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / ports.len().max(1)).saturating_sub(1).clamp(3, 12) as u16;

    let bars: Vec<Bar> = ports
        .iter()
        .enumerate()
        .map(|(i, port)| {
            let percent = (port.utilization * 100.0).round().max(0.0) as u64;
            let mut style = Style::default().fg(app.theme.congested);
            if i == app.selected_index {
                style = style.add_modifier(Modifier::BOLD);
            }
            Bar::default()
                .value(percent)
                .text_value(format!("{}%", percent))
                .label(Line::from(short_port(&port.port, bar_width as usize)))
                .style(style)
        })
        .collect();

    let widget = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(100)
        .value_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(widget, area);
}
