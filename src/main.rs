// src/main.rs

use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

mod app;
mod config;
mod core;
mod logging;
mod ui;

use crate::app::App;
use crate::config::{Cli, Config};
use crate::core::api::{Backend, HttpBackend};
use crate::core::dispatcher::{dispatch, send_beacon, spawn_beacon, spawn_scan, AppEvent};

const POLL_RATE: Duration = Duration::from_millis(100);
const TICK_RATE: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    let log_path = logging::initialize_logging()?;
    info!(
        api_url = %config.api_url,
        variant = %config.variant,
        free_checks = config.policy.len(),
        log = %log_path.display(),
        "Starting WebSecCheck."
    );
    if config.policy.is_empty() {
        warn!("No free checks configured; every check will be locked.");
    }

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config.api_url, config.request_timeout)?);
    let mut app = App::new(config.variant, config.policy.clone());
    if let Some(url) = cli.url {
        app.url_input = url;
    }

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let outcome = run(&mut terminal, &mut app, backend).await;

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    outcome?;

    if let Some(target) = app.redirect {
        info!(target = %target, "Handing off to checkout.");
        println!("Continue to secure checkout:\n  {target}");
    }
    Ok(())
}

async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App, backend: Arc<dyn Backend>) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<AppEvent>(16);
    let mut last_tick = Instant::now();

    if !app.url_input.trim().is_empty() {
        if let Some(ticket) = app.submit_scan() {
            spawn_scan(backend.clone(), ticket, tx.clone());
        }
    }

    while !app.should_quit {
        if let Some((path, referrer)) = app.take_view_change() {
            spawn_beacon(backend.clone(), path, referrer);
        }

        terminal.draw(|frame| ui::render(app, frame))?;

        if event::poll(POLL_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(request) = app.handle_key(key) {
                        dispatch(backend.clone(), request, tx.clone());
                    }
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        while last_tick.elapsed() >= TICK_RATE {
            app.on_tick();
            last_tick += TICK_RATE;
        }
        app.advance_spinner();
    }

    // A checkout redirect quits in the same pass that changed the view.
    if let Some((path, referrer)) = app.take_view_change() {
        send_beacon(backend.as_ref(), path, referrer).await;
    }
    Ok(())
}
