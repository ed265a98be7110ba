//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;
use sdnwatch_types::BackendState;

use crate::data::{EdgeStyle, SeriesKey};

/// Line color of a series, shared by the TUI and PNG export.
pub fn series_rgb(key: SeriesKey) -> [u8; 3] {
    match key {
        SeriesKey::ThroughputBaseline => [0, 247, 255],
        SeriesKey::ThroughputProposed => [0, 255, 156],
        SeriesKey::LatencyBaseline => [255, 159, 0],
        SeriesKey::LatencyProposed => [255, 216, 107],
        SeriesKey::PacketLossBaseline => [255, 0, 76],
        SeriesKey::PacketLossProposed => [255, 138, 160],
        SeriesKey::Ewma => [0, 255, 156],
        SeriesKey::Flows => [142, 166, 255],
    }
}

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    pub safe: Color,
    pub predicted: Color,
    pub congested: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Congestion marker strokes.
    pub marker: Color,
    pub edge_normal: Color,
    pub edge_congested: Color,
    pub edge_rerouted: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    /// Controls that cannot be used right now.
    pub disabled: Style,
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            safe: Color::Green,
            predicted: Color::Yellow,
            congested: Color::Red,
            border: Color::Gray,
            marker: Color::LightRed,
            edge_normal: Color::Gray,
            edge_congested: Color::Rgb(255, 77, 77),
            edge_rerouted: Color::Rgb(77, 166, 255),
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            disabled: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            safe: Color::Green,
            predicted: Color::Yellow,
            congested: Color::Red,
            border: Color::DarkGray,
            marker: Color::Red,
            edge_normal: Color::DarkGray,
            edge_congested: Color::Red,
            edge_rerouted: Color::Blue,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            disabled: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// SAFE green, PREDICTED_CONGESTION yellow, anything else red.
    pub fn state_style(&self, state: &BackendState) -> Style {
        match state {
            BackendState::Safe => Style::default().fg(self.safe),
            BackendState::PredictedCongestion => Style::default().fg(self.predicted),
            _ => Style::default()
                .fg(self.congested)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn edge_style(&self, style: EdgeStyle) -> Style {
        match style {
            EdgeStyle::Normal => Style::default().fg(self.edge_normal),
            EdgeStyle::Congested => Style::default().fg(self.edge_congested),
            EdgeStyle::Rerouted => Style::default()
                .fg(self.edge_rerouted)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn series_color(&self, key: SeriesKey) -> Color {
        let [r, g, b] = series_rgb(key);
        Color::Rgb(r, g, b)
    }

    /// Style for a control hint, dimmed when unavailable.
    pub fn control(&self, enabled: bool) -> Style {
        if enabled {
            Style::default().fg(self.highlight)
        } else {
            self.disabled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.state_style(&BackendState::Safe).fg, Some(Color::Green));
        assert_eq!(
            theme.state_style(&BackendState::PredictedCongestion).fg,
            Some(Color::Yellow)
        );
        assert_eq!(theme.state_style(&BackendState::Congested).fg, Some(Color::Red));
        // Unknown states are treated as danger
        assert_eq!(
            theme.state_style(&BackendState::from("UNKNOWN")).fg,
            Some(Color::Red)
        );
    }

    #[test]
    fn test_rerouted_edges_are_blue() {
        let theme = Theme::light();
        assert_eq!(theme.edge_style(EdgeStyle::Rerouted).fg, Some(Color::Blue));
        assert_eq!(theme.edge_style(EdgeStyle::Congested).fg, Some(Color::Red));
    }

    #[test]
    fn test_paired_series_have_distinct_colors() {
        for chart in crate::data::ChartKind::ALL {
            let colors: Vec<_> = chart.series().iter().map(|k| series_rgb(*k)).collect();
            for (i, a) in colors.iter().enumerate() {
                assert!(colors[i + 1..].iter().all(|b| b != a), "{:?}", chart);
            }
        }
    }
}
