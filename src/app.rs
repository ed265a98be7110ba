//! Application state and navigation logic.
//!
//! [`App`] owns the [`Session`] and is the only place it is mutated.
//! Background requests report back through an update channel that the UI
//! loop drains with [`App::drain_updates`] once per frame.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, Utc};
use sdnwatch_types::{MetricsSnapshot, TrafficStatus};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::control::{self, Command, CommandReply, Controls, DEFAULT_MODE_COOLDOWN};
use crate::data::DEFAULT_WINDOW;
use crate::export::{self, DEFAULT_SIZE};
use crate::record::Recorder;
use crate::session::Session;
use crate::source::{Backend, MetricsPoller, TopologyRefresher, Update};
use crate::ui::Theme;

/// How long a status bar message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Time-series charts and the top ports bar chart.
    Charts,
    /// Links and nodes of the network graph.
    Topology,
    /// Congestion markers placed so far.
    Markers,
}

impl View {
    pub const ALL: [View; 3] = [View::Charts, View::Topology, View::Markers];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Charts => View::Topology,
            View::Topology => View::Markers,
            View::Markers => View::Charts,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Charts => View::Markers,
            View::Topology => View::Charts,
            View::Markers => View::Topology,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Charts => "Charts",
            View::Topology => "Topology",
            View::Markers => "Markers",
        }
    }
}

/// Tunables for an [`App`].
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub window: usize,
    pub metrics_interval: Duration,
    pub topology_interval: Duration,
    pub mode_cooldown: Duration,
    /// Pixel size of exported chart images.
    pub export_size: (u32, u32),
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            metrics_interval: Duration::from_secs(2),
            topology_interval: Duration::from_secs(2),
            mode_cooldown: DEFAULT_MODE_COOLDOWN,
            export_size: DEFAULT_SIZE,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    /// Modal message that stays until a key is pressed.
    pub alert: Option<String>,

    pub session: Session,
    pub controls: Controls,
    /// Last metrics poll failure, cleared by the next success.
    pub poll_error: Option<String>,

    // Navigation state
    pub selected_index: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,

    backend: Arc<dyn Backend>,
    runtime: Handle,
    updates_tx: UnboundedSender<Update>,
    updates_rx: UnboundedReceiver<Update>,
    poller: MetricsPoller,
    refresher: TopologyRefresher,
    recorder: Option<Recorder>,
    export_size: (u32, u32),
}

impl App {
    /// Create an app that talks to `backend`, spawning requests on `runtime`.
    pub fn new(backend: Arc<dyn Backend>, runtime: Handle, options: AppOptions) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            running: true,
            current_view: View::Charts,
            show_help: false,
            alert: None,
            session: Session::new(options.window),
            controls: Controls::new(options.mode_cooldown),
            poll_error: None,
            selected_index: 0,
            theme: Theme::dark(),
            status_message: None,
            backend,
            runtime,
            updates_tx,
            updates_rx,
            poller: MetricsPoller::new(options.metrics_interval),
            refresher: TopologyRefresher::new(options.topology_interval),
            recorder: None,
            export_size: options.export_size,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Append every applied metrics poll to `recorder`.
    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Returns a description of the backend.
    pub fn source_description(&self) -> &str {
        self.backend.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Start of session: ask whether traffic is already running and start
    /// the topology refresher.
    pub fn load(&mut self) {
        let backend = self.backend.clone();
        let updates = self.updates_tx.clone();
        self.runtime.spawn(async move {
            let _ = updates.send(Update::TrafficStatus(backend.traffic_status().await));
        });

        self.refresher
            .refresh_now(&self.runtime, self.backend.clone(), self.updates_tx.clone());
        self.refresher
            .start(&self.runtime, self.backend.clone(), self.updates_tx.clone());
        info!(backend = self.backend.description(), "session loaded");
    }

    /// Send `command` unless its control is currently disabled.
    ///
    /// Returns whether a request was sent.
    pub fn request(&mut self, command: Command) -> bool {
        let now = Instant::now();
        if let Err(rejection) = self.controls.begin(command, now) {
            debug!(%command, %rejection, "command ignored");
            self.set_status_message(rejection.to_string());
            return false;
        }

        let charts = if command == Command::ExportCharts {
            let (width, height) = self.export_size;
            match export::export_charts(&self.session, width, height) {
                Ok(charts) => charts,
                Err(e) => {
                    warn!(error = %e, "chart rendering failed");
                    self.controls.finish(command, false, now);
                    self.alert = Some(format!("{}: {:#}", command.failure_message(), e));
                    return false;
                }
            }
        } else {
            Vec::new()
        };

        control::dispatch(
            &self.runtime,
            self.backend.clone(),
            command,
            charts,
            self.updates_tx.clone(),
        );
        true
    }

    /// Apply every update that has arrived. Returns how many were applied.
    pub fn drain_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.updates_rx.try_recv() {
            debug!(kind = update.kind(), "applying update");
            self.apply_update(update);
            applied += 1;
        }
        applied
    }

    pub fn apply_update(&mut self, update: Update) {
        match update {
            Update::Metrics { sequence, result } => match result {
                Ok(snapshot) => self.apply_metrics(sequence, &snapshot),
                Err(e) => {
                    warn!(sequence, error = %e, "metrics poll failed");
                    self.poll_error = Some(e.to_string());
                }
            },
            Update::Topology(result) => match result {
                Ok(snapshot) => self.session.apply_topology(&snapshot),
                Err(e) => debug!(error = %e, "topology refresh failed"),
            },
            Update::TrafficStatus(result) => match result {
                Ok(status) => self.apply_traffic_status(status),
                Err(e) => warn!(error = %e, "traffic status unavailable, polling stays off"),
            },
            Update::Command { command, result } => {
                self.controls.finish(command, result.is_ok(), Instant::now());
                match result {
                    Ok(reply) => self.apply_command(command, reply),
                    Err(e) => {
                        warn!(%command, error = %e, "command failed");
                        self.alert = Some(format!("{}: {}", command.failure_message(), e));
                    }
                }
            }
        }
    }

    fn apply_metrics(&mut self, sequence: u64, snapshot: &MetricsSnapshot) {
        let label = now_label();
        let Some(applied) = self.session.apply_metrics(sequence, snapshot, &label) else {
            return;
        };
        self.poll_error = None;

        if let Some(ordinal) = applied.marker {
            self.set_status_message(format!("CONGEST {} at {}", ordinal, label));
        }
        if let Err(e) = self.record(snapshot) {
            let lines = self.recorder.as_ref().map(Recorder::lines).unwrap_or_default();
            warn!(error = %e, lines, "recording disabled");
            self.recorder = None;
        }
    }

    fn record(&mut self, snapshot: &MetricsSnapshot) -> Result<()> {
        match self.recorder.as_mut() {
            Some(recorder) => recorder.record(snapshot, Utc::now()),
            None => Ok(()),
        }
    }

    fn apply_traffic_status(&mut self, status: TrafficStatus) {
        info!(running = status.running, "traffic status at load");
        self.controls.set_traffic_running(status.running);
        if status.running {
            self.start_polling();
        }
    }

    fn apply_command(&mut self, command: Command, reply: CommandReply) {
        info!(%command, "command succeeded");
        match (command, reply) {
            (Command::StartTraffic, _) => {
                self.start_polling();
                self.set_status_message("Traffic started".to_string());
            }
            (Command::StopTraffic, _) => {
                self.poller.stop();
                self.set_status_message("Traffic stopped".to_string());
            }
            (Command::Congest, _) => {
                let (ordinal, at) = self.session.add_explicit_marker(&now_label());
                self.set_status_message(format!("CONGEST {} at {}", ordinal, at));
            }
            (Command::SetMode(requested), reply) => {
                let mode = match reply {
                    CommandReply::Mode(change) => change.mode,
                    _ => requested,
                };
                self.session.set_mode(mode);
                self.set_status_message(format!("Mode: {}", mode.as_str().to_uppercase()));
            }
            (Command::ExportCharts, CommandReply::Saved(saved)) => {
                self.alert = Some(format!("Saved charts:\n{}", saved.saved.join("\n")));
            }
            (Command::ExportCharts, _) => {
                self.alert = Some("Saved charts".to_string());
            }
        }
    }

    fn start_polling(&mut self) {
        self.poller
            .start(&self.runtime, self.backend.clone(), self.updates_tx.clone());
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Fetch the topology now instead of waiting for the next refresh.
    pub fn refresh_topology(&mut self) {
        self.refresher
            .refresh_now(&self.runtime, self.backend.clone(), self.updates_tx.clone());
        self.set_status_message("Refreshing topology".to_string());
    }

    pub fn clear_markers(&mut self) {
        self.session.clear_markers();
        self.selected_index = 0;
        self.set_status_message("Markers cleared".to_string());
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.selected_index = 0;
    }

    /// Rows in the current view's list.
    fn item_count(&self) -> usize {
        match self.current_view {
            View::Charts => self.session.top_ports().len(),
            View::Topology => self.session.topology().edges().len(),
            View::Markers => self.session.markers().markers().len(),
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        let max = self.item_count().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Cancel both schedules.
    pub fn shutdown(&mut self) {
        self.poller.stop();
        self.refresher.stop();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Wall-clock label for the charts' time axis.
pub fn now_label() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
