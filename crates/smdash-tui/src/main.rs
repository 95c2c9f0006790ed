#![deny(unsafe_code)]

//! smdash TUI: live terminal dashboard for a SecureMonitor daemon.
//!
//! Usage: `smdash-tui [CONFIG]` (defaults to `smdash.toml`).

mod app;
mod keymap;
mod panels;

use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEvent, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use smdash_config::AppConfig;
use smdash_core::{DaemonApi, DashboardEvent, HttpDaemonClient, Poller, build_info};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;

/// How often the screen is redrawn without input, for relative times and
/// flash expiry.
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

const INPUT_POLL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("smdash.toml"));

    let (config, source) = if config_path.exists() {
        let config = AppConfig::load(&config_path)
            .await
            .with_context(|| format!("invalid config {}", config_path.display()))?;
        (config, Some(config_path))
    } else {
        (AppConfig::default(), None)
    };

    init_logging(&config)?;
    info!(
        version = %build_info::version_string(),
        url = %config.daemon.base_url,
        "starting smdash TUI"
    );

    let api: Arc<dyn DaemonApi> = Arc::new(HttpDaemonClient::from_config(&config)?);
    let (poller, mut events) = Poller::new(api);
    let ticker = poller.spawn_ticker(config.poll_interval());
    let mut app = App::new(&config, source.as_deref(), poller);

    let (key_tx, mut keys) = mpsc::unbounded_channel();
    spawn_input_reader(key_tx);

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = run(&mut terminal, &mut app, &mut events, &mut keys).await;

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    ticker.abort();
    info!("smdash TUI stopped");

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    events: &mut UnboundedReceiver<DashboardEvent>,
    keys: &mut UnboundedReceiver<KeyEvent>,
) -> Result<()> {
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);
    while !app.should_quit {
        terminal.draw(|frame| app.render(frame))?;

        tokio::select! {
            Some(key) = keys.recv() => app.handle_key(key),
            Some(event) = events.recv() => app.handle_event(event),
            _ = redraw.tick() => app.tick(Instant::now()),
        }
    }
    Ok(())
}

/// Read terminal key presses on a plain thread and forward them.
fn spawn_input_reader(tx: UnboundedSender<KeyEvent>) {
    std::thread::spawn(move || {
        loop {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        if tx.send(key).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "terminal read failed");
                        break;
                    }
                },
                Ok(false) if tx.is_closed() => break,
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "terminal poll failed");
                    break;
                }
            }
        }
    });
}

/// The terminal is ours, so logs only go to `logging.file` when set.
fn init_logging(config: &AppConfig) -> Result<()> {
    let Some(path) = &config.logging.file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {path}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
