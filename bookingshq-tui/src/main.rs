//! Terminal UI for BookingsHQ: browse bookings, drive their lifecycle, and create new ones
//! with live address lookup.

mod app;
mod input;
mod ui;

use std::{fs::File, io, path::PathBuf, sync::Mutex, time::Duration as StdDuration};

use anyhow::{Context, Result};
use bookingshq_core::{AddressField, AddressResolver, BookingRegistry, Config};
use bookingshq_geocoder_gazetteer as gazetteer;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let config = load_config()?;

    // Core setup
    let registry = BookingRegistry::with_sample_data(config.creation.clone());
    let resolver = AddressResolver::from_config(gazetteer::geocoder(), &config);
    let app = App::new(registry, resolver);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Geocode results are applied here, on the loop that owns all booking state
        for event in app.resolver.drain() {
            app.on_resolver_event(&event);
        }

        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (short timeout so resolver results show up promptly)
        if !event::poll(StdDuration::from_millis(50))? {
            tokio::task::yield_now().await;
            continue;
        }
        let CEvent::Key(key) = event::read()? else {
            continue;
        };

        app.error_message = None;
        match input::handle_key_event(key, &mut app) {
            Action::Quit => break,
            Action::None => {}
            Action::AddressEdited(field) => {
                let text = match field {
                    AddressField::Pickup => app.form.pickup.clone(),
                    AddressField::Dropoff => app.form.dropoff.clone(),
                };
                if let Some(event) = app.resolver.on_address_changed(field, text) {
                    app.on_resolver_event(&event);
                }
            }
        }
    }

    info!("shutting down");
    Ok(())
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".bookingshq").join("config.toml"))
}

fn load_config() -> Result<Config> {
    match config_path() {
        Some(path) if path.exists() => {
            let config = Config::load(&path)?;
            info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        _ => Ok(Config::default()),
    }
}

/// Log to a file; the terminal belongs to the UI.
fn init_tracing() -> Result<()> {
    let path = std::env::temp_dir().join("bookingshq.log");
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter =
        EnvFilter::try_from_env("BOOKINGSHQ_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
