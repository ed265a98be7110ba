use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use sdnwatch_types::OperatingMode;

use crate::app::{App, View};
use crate::control::Command;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Alerts are modal: any key acknowledges
    if app.alert.is_some() {
        app.dismiss_alert();
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::Char('1') => app.set_view(View::Charts),
        KeyCode::Char('2') => app.set_view(View::Topology),
        KeyCode::Char('3') => app.set_view(View::Markers),

        // List navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),

        // Controls
        KeyCode::Char('s') => {
            app.request(Command::StartTraffic);
        }
        KeyCode::Char('x') => {
            app.request(Command::StopTraffic);
        }
        KeyCode::Char('c') => {
            app.request(Command::Congest);
        }
        KeyCode::Char('b') => {
            app.request(Command::SetMode(OperatingMode::Baseline));
        }
        KeyCode::Char('p') => {
            app.request(Command::SetMode(OperatingMode::Proposed));
        }
        KeyCode::Char('e') => {
            app.request(Command::ExportCharts);
        }

        KeyCode::Char('m') => app.clear_markers(),
        KeyCode::Char('r') => app.refresh_topology(),
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Width of one tab title as rendered by `ui::common::render_tabs`.
fn tab_width(view: View) -> u16 {
    // " n:Label " plus the divider
    view.label().len() as u16 + 5
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            if app.alert.is_some() {
                app.dismiss_alert();
                return;
            }

            // Tab bar sits on the row after the header
            if mouse.row == 1 {
                let mut start = 0;
                for view in View::ALL {
                    let end = start + tab_width(view);
                    if mouse.column < end {
                        app.set_view(view);
                        break;
                    }
                    start = end;
                }
                return;
            }

            // List rows in the Topology and Markers views (after a table header)
            if mouse.row > content_start_row && app.current_view != View::Charts {
                let row = (mouse.row - content_start_row - 1) as usize;
                let count = match app.current_view {
                    View::Topology => app.session.topology().edges().len(),
                    View::Markers => app.session.markers().markers().len(),
                    View::Charts => 0,
                };
                if row < count {
                    app.selected_index = row;
                }
            }
        }

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppOptions;
    use crate::source::scripted::ScriptedBackend;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use std::sync::Arc;
    use tokio::runtime::Handle;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn app() -> App {
        App::new(
            Arc::new(ScriptedBackend::new()),
            Handle::current(),
            AppOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_view_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(app.current_view, View::Topology);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Markers);
        handle_key_event(&mut app, key(KeyCode::Left));
        assert_eq!(app.current_view, View::Topology);
    }

    #[tokio::test]
    async fn test_alert_swallows_next_key() {
        let mut app = app();
        app.alert = Some("Failed to save charts".to_string());
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.alert.is_none());
        assert!(app.running);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_help_toggle() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert!(!app.show_help);
        assert_eq!(app.current_view, View::Charts);
    }

    #[tokio::test]
    async fn test_stop_key_ignored_when_stopped() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('x')));
        assert!(app.get_status_message().unwrap().contains("not running"));
    }

    #[tokio::test]
    async fn test_tab_clicks() {
        let mut app = app();
        // " 1:Charts " is 10 wide, " 2:Topology " starts after it
        handle_mouse_event(&mut app, click(12, 1), 3);
        assert_eq!(app.current_view, View::Topology);
        handle_mouse_event(&mut app, click(2, 1), 3);
        assert_eq!(app.current_view, View::Charts);
    }
}
