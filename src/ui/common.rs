//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, the help
//! overlay and the alert overlay.

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_duration;

/// Render the header bar: `STATE | MODE`, traffic, and control availability.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mode = app.session.mode().as_str().to_uppercase();
    let mut spans = vec![Span::styled(
        " SDN CONTROL CENTER ",
        Style::default().add_modifier(Modifier::BOLD),
    )];

    match app.session.state() {
        Some(state) => {
            let style = app.theme.state_style(state);
            spans.push(Span::styled("● ", style));
            spans.push(Span::styled(format!("{} | {}", state, mode), style));
        }
        None => spans.push(Span::styled(
            format!("waiting | {}", mode),
            Style::default().add_modifier(Modifier::DIM),
        )),
    }

    let controls = &app.controls;
    let now = Instant::now();
    let traffic = if controls.traffic_running() {
        Span::styled(" │ traffic on ", Style::default().fg(app.theme.safe))
    } else {
        Span::styled(" │ traffic off ", Style::default().add_modifier(Modifier::DIM))
    };
    spans.push(traffic);
    spans.push(Span::raw("│ "));
    spans.push(Span::styled("s:start ", app.theme.control(controls.can_start())));
    spans.push(Span::styled("x:stop ", app.theme.control(controls.can_stop())));
    spans.push(Span::styled("c:congest ", app.theme.control(true)));
    let mode_enabled = controls.can_switch_mode(now);
    spans.push(Span::styled("b:baseline ", app.theme.control(mode_enabled)));
    spans.push(Span::styled("p:proposed ", app.theme.control(mode_enabled)));
    spans.push(Span::styled("e:export", app.theme.control(true)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let selected = View::ALL
        .iter()
        .position(|v| *v == app.current_view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|")
        .padding("", "");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the backend, time since the last applied poll and the last poll
/// error. Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let updated = match app.session.last_update() {
        Some(at) => format!("Updated {} ago", format_duration(at.elapsed())),
        None if app.is_polling() => "Waiting for first poll".to_string(),
        None => "Polling off".to_string(),
    };
    let markers = app.session.markers().markers().len();

    let status = match &app.poll_error {
        Some(err) => format!(
            " {} | {} | Last poll failed: {} | ?:help q:quit",
            app.source_description(),
            updated,
            err
        ),
        None => format!(
            " {} | {} | {} marker(s) | ?:help q:quit",
            app.source_description(),
            updated,
            markers
        ),
    };

    let style = if app.poll_error.is_some() {
        Style::default().fg(app.theme.predicted)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Rect of at most `width` x `height` centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ Tab     Switch views"),
        Line::from("  1 2 3       Jump to view"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from(""),
        section(" Controls"),
        Line::from("  s / x       Start / stop traffic"),
        Line::from("  c           Trigger congestion"),
        Line::from("  b / p       Baseline / proposed mode"),
        Line::from("  e           Export charts to backend"),
        Line::from(""),
        section(" General"),
        Line::from("  m         Clear markers"),
        Line::from("  r         Refresh topology"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let help_area = centered(area, 44, 22);
    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}

/// Render the modal alert raised by a failed or completed command.
pub fn render_alert(frame: &mut Frame, app: &App, area: Rect) {
    let Some(message) = &app.alert else {
        return;
    };

    let mut lines: Vec<Line> = message.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to dismiss",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let longest = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    let height = lines.len() as u16 + 2;

    let block = Block::default()
        .title(" Alert ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.predicted));

    let alert_area = centered(area, longest + 4, height);
    frame.render_widget(Clear, alert_area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        alert_area,
    );
}
