//! Topology view rendering.
//!
//! The link table carries the styling the backend asked for: rerouted links
//! are highlighted, congested links are drawn in the congestion color, and
//! the stroke column widens with emphasis.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{EdgeStyle, EdgeView};

/// Render the Topology view: links on the left, known nodes on the right.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);
    render_links(frame, app, chunks[0]);
    render_nodes(frame, app, chunks[1]);
}

/// Glyphs drawn in the stroke column, one per unit of width.
fn stroke(edge: &EdgeView) -> String {
    let glyph = match edge.style {
        EdgeStyle::Normal => "─",
        EdgeStyle::Congested => "━",
        EdgeStyle::Rerouted => "═",
    };
    glyph.repeat(edge.width() as usize)
}

fn render_links(frame: &mut Frame, app: &App, area: Rect) {
    let graph = app.session.topology();
    let edges = graph.edges();

    let block = Block::default()
        .title(format!(" Links ({}) ", edges.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if edges.is_empty() {
        let text = if graph.refreshes() == 0 {
            "Waiting for topology..."
        } else {
            "No links reported"
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec!["From", "To", "Line", "Label"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = edges
        .iter()
        .map(|edge| {
            let style = app.theme.edge_style(edge.style);
            Row::new(vec![
                Cell::from(graph.node_label(&edge.from).to_string()),
                Cell::from(graph.node_label(&edge.to).to_string()),
                Cell::from(Span::styled(stroke(edge), style)),
                Cell::from(Span::styled(edge.label.clone(), style)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(5),
        Constraint::Fill(2),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_index.min(edges.len() - 1)));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_nodes(frame: &mut Frame, app: &App, area: Rect) {
    let graph = app.session.topology();
    let items: Vec<ListItem> = graph
        .nodes()
        .map(|node| {
            if node.label == node.id {
                ListItem::new(node.id.clone())
            } else {
                ListItem::new(format!("{} ({})", node.label, node.id))
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!(" Nodes ({}) ", graph.node_count()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(list, area);
}
