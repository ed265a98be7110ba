use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use sdnwatch::config::{Overrides, Settings};
use sdnwatch::logging::{self, LogTarget};
use sdnwatch::ui::{self, Theme};
use sdnwatch::watch::{self, Watcher};
use sdnwatch::{events, App, AppOptions, Backend, Recorder, View};
use sdnwatch_client::BackendClient;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sdnwatch")]
#[command(about = "Terminal dashboard for the SDN congestion control testbed")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (e.g., "http://127.0.0.1:5000")
    #[arg(short, long)]
    url: Option<String>,

    /// Metrics poll interval (e.g., "2s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Topology refresh interval
    #[arg(long)]
    topology_interval: Option<String>,

    /// Points kept per chart
    #[arg(short, long)]
    window: Option<usize>,

    /// Per-request timeout
    #[arg(long)]
    timeout: Option<String>,

    /// Append every applied metrics poll to this JSON-lines file
    #[arg(short, long)]
    record: Option<PathBuf>,

    /// Log file used while the dashboard owns the terminal
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print one line per poll instead of running the dashboard
    #[arg(long)]
    watch: bool,

    /// In watch mode, exit after this many consecutive SAFE polls
    #[arg(long, requires = "watch")]
    exit_when_safe: Option<u32>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            timeout: self.timeout.clone(),
            metrics_interval: self.interval.clone(),
            topology_interval: self.topology_interval.clone(),
            window: self.window,
            record: self.record.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;

    let target = if args.watch {
        LogTarget::Stderr
    } else {
        LogTarget::File(settings.logging.file.clone())
    };
    logging::init(&target, &settings.logging.level)?;

    let client = BackendClient::builder()
        .endpoint(settings.backend.url.clone())
        .timeout(settings.timeout()?)
        .build()
        .context("Failed to build HTTP client")?;

    let recorder = match &settings.record.path {
        Some(path) => Some(Recorder::open(path)?),
        None => None,
    };

    let rt = tokio::runtime::Runtime::new()?;

    if args.watch {
        let mut watcher = Watcher::new(io::stdout(), args.exit_when_safe);
        if let Some(recorder) = recorder {
            watcher = watcher.with_recorder(recorder);
        }
        let interval = settings.metrics_interval()?;
        return rt.block_on(async { watch::run(&client, interval, &mut watcher).await });
    }

    let options = AppOptions {
        window: settings.polling.window,
        metrics_interval: settings.metrics_interval()?,
        topology_interval: settings.topology_interval()?,
        mode_cooldown: settings.mode_cooldown()?,
        ..AppOptions::default()
    };
    let backend: Arc<dyn Backend> = Arc::new(client);
    let mut app = App::new(backend, rt.handle().clone(), options).with_theme(Theme::auto_detect());
    if let Some(recorder) = recorder {
        app = app.with_recorder(recorder);
    }

    info!(backend = %settings.backend.url, "starting dashboard");
    let result = run_tui(&mut app);
    app.shutdown();
    rt.shutdown_timeout(Duration::from_secs(1));
    result
}

/// Run the dashboard until the user quits.
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    app.load();

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for the chart grid
    const MIN_WIDTH: u16 = 80;
    const MIN_HEIGHT: u16 = 20;

    while app.running {
        app.drain_updates();

        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered = ratatui::layout::Rect::new(0, top, area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(12),   // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Charts => ui::charts::render(frame, app, chunks[2]),
                View::Topology => ui::topology::render(frame, app, chunks[2]),
                View::Markers => ui::markers::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
            if app.alert.is_some() {
                ui::common::render_alert(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Table rows start after header (1) + tabs (1) + border (1) + table header (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                _ => {}
            }
        }
    }

    Ok(())
}
