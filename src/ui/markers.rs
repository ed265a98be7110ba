//! Markers view: every congestion marker with its per-chart extent.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{ChartKind, CongestionMarker};

const SPAN_CHARTS: [ChartKind; 3] = [ChartKind::Throughput, ChartKind::Latency, ChartKind::Ewma];

fn format_span((low, high): (f64, f64)) -> String {
    format!("{:.1}..{:.1}", low, high)
}

/// Whether the marker's label is still inside the sliding window.
fn in_window(app: &App, marker: &CongestionMarker) -> bool {
    app.session
        .buffer(ChartKind::Throughput)
        .and_then(|b| b.position_of(&marker.at))
        .is_some()
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let markers = app.session.markers().markers();
    let block = Block::default()
        .title(format!(" Congestion Markers ({}) [m:clear] ", markers.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if markers.is_empty() {
        let paragraph = Paragraph::new("No congestion events yet")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let mut header = vec!["Marker".to_string(), "At".to_string()];
    header.extend(SPAN_CHARTS.iter().map(|c| c.title().to_string()));
    header.push("Shown".to_string());
    let header = Row::new(header).height(1).style(app.theme.header);

    let rows: Vec<Row> = markers
        .iter()
        .map(|marker| {
            let mut cells = vec![
                Cell::from(marker.label()).style(Style::default().fg(app.theme.marker)),
                Cell::from(marker.at.clone()),
            ];
            cells.extend(
                SPAN_CHARTS
                    .iter()
                    .map(|chart| Cell::from(format_span(marker.span(*chart)))),
            );
            let shown = if in_window(app, marker) { "yes" } else { "-" };
            cells.push(Cell::from(shown));
            Row::new(cells)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_index.min(markers.len() - 1)));
    frame.render_stateful_widget(table, area, &mut state);
}
