//! One-shot control commands and the local control state.
//!
//! A command is checked against [`Controls`] on the UI thread, executed as
//! a single request on the runtime, and its result comes back as an
//! [`Update::Command`]. The UI thread applies the effect of a successful
//! command; failures become a user-visible alert.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sdnwatch_client::{ChartImage, ClientError};
use sdnwatch_types::{CommandStatus, ModeChange, OperatingMode, SavedCharts};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::source::{Backend, Update};

/// Default time both mode controls stay blocked after a successful switch.
pub const DEFAULT_MODE_COOLDOWN: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartTraffic,
    StopTraffic,
    Congest,
    SetMode(OperatingMode),
    ExportCharts,
}

impl Command {
    /// Alert text when the command fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Command::StartTraffic => "Failed to start traffic",
            Command::StopTraffic => "Failed to stop traffic",
            Command::Congest => "Failed to trigger congestion",
            Command::SetMode(_) => "Failed to change mode",
            Command::ExportCharts => "Failed to save charts",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::StartTraffic => write!(f, "start-traffic"),
            Command::StopTraffic => write!(f, "stop"),
            Command::Congest => write!(f, "congest"),
            Command::SetMode(mode) => write!(f, "mode/{}", mode),
            Command::ExportCharts => write!(f, "save-charts"),
        }
    }
}

/// Successful backend answer to a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    Ack(CommandStatus),
    Mode(ModeChange),
    Saved(SavedCharts),
}

/// Why a command was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AlreadyRunning,
    NotRunning,
    CoolingDown(Duration),
    Pending,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::AlreadyRunning => write!(f, "Traffic is already running"),
            Rejection::NotRunning => write!(f, "Traffic is not running"),
            Rejection::CoolingDown(left) => {
                write!(f, "Mode controls blocked for {}ms", left.as_millis())
            }
            Rejection::Pending => write!(f, "A request is already in progress"),
        }
    }
}

/// Blocks an action until a point in time.
#[derive(Debug, Clone)]
pub struct Cooldown {
    period: Duration,
    until: Option<Instant>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self { period, until: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn arm(&mut self, now: Instant) {
        self.until = Some(now + self.period);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.remaining(now).is_some()
    }

    /// Time left, `None` once expired.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.until
            .and_then(|until| until.checked_duration_since(now))
            .filter(|left| !left.is_zero())
    }
}

/// Enabled/disabled state of the controls.
#[derive(Debug, Clone)]
pub struct Controls {
    traffic_running: bool,
    mode_cooldown: Cooldown,
    pending: Vec<Command>,
}

impl Controls {
    pub fn new(mode_cooldown: Duration) -> Self {
        Self {
            traffic_running: false,
            mode_cooldown: Cooldown::new(mode_cooldown),
            pending: Vec::new(),
        }
    }

    pub fn traffic_running(&self) -> bool {
        self.traffic_running
    }

    pub fn set_traffic_running(&mut self, running: bool) {
        self.traffic_running = running;
    }

    pub fn can_start(&self) -> bool {
        !self.traffic_running
    }

    pub fn can_stop(&self) -> bool {
        self.traffic_running
    }

    pub fn can_switch_mode(&self, now: Instant) -> bool {
        !self.mode_cooldown.is_active(now)
    }

    pub fn mode_cooldown(&self) -> &Cooldown {
        &self.mode_cooldown
    }

    /// Check that `command` may be sent now, and mark it in flight if so.
    ///
    /// Only one request per command kind is in flight at a time.
    pub fn begin(&mut self, command: Command, now: Instant) -> Result<(), Rejection> {
        match command {
            Command::StartTraffic if !self.can_start() => return Err(Rejection::AlreadyRunning),
            Command::StopTraffic if !self.can_stop() => return Err(Rejection::NotRunning),
            Command::SetMode(_) => {
                if let Some(left) = self.mode_cooldown.remaining(now) {
                    return Err(Rejection::CoolingDown(left));
                }
            }
            _ => {}
        }
        if self.pending.iter().any(|p| same_kind(p, &command)) {
            return Err(Rejection::Pending);
        }
        self.pending.push(command);
        Ok(())
    }

    /// Record the outcome of `command`, updating control state on success.
    pub fn finish(&mut self, command: Command, succeeded: bool, now: Instant) {
        self.pending.retain(|p| !same_kind(p, &command));
        if !succeeded {
            return;
        }
        match command {
            Command::StartTraffic => self.traffic_running = true,
            Command::StopTraffic => self.traffic_running = false,
            Command::SetMode(_) => self.mode_cooldown.arm(now),
            Command::Congest | Command::ExportCharts => {}
        }
    }

    pub fn is_pending(&self, command: Command) -> bool {
        self.pending.iter().any(|p| same_kind(p, &command))
    }
}

fn same_kind(a: &Command, b: &Command) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Issue the single request behind `command`.
pub async fn execute(
    backend: &dyn Backend,
    command: Command,
    charts: Vec<ChartImage>,
) -> Result<CommandReply, ClientError> {
    match command {
        Command::StartTraffic => backend.start_traffic().await.map(CommandReply::Ack),
        Command::StopTraffic => backend.stop_traffic().await.map(CommandReply::Ack),
        Command::Congest => backend.congest().await.map(CommandReply::Ack),
        Command::SetMode(mode) => backend.set_mode(mode).await.map(CommandReply::Mode),
        Command::ExportCharts => backend.save_charts(charts).await.map(CommandReply::Saved),
    }
}

/// Run `command` on the runtime and report back through `updates`.
pub fn dispatch(
    handle: &Handle,
    backend: Arc<dyn Backend>,
    command: Command,
    charts: Vec<ChartImage>,
    updates: UnboundedSender<Update>,
) {
    info!(%command, "sending command");
    handle.spawn(async move {
        let result = execute(backend.as_ref(), command, charts).await;
        let _ = updates.send(Update::Command { command, result });
    });
}
