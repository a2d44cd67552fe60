//! BACKOFFICE TUI entry point.

use backoffice_core::PAGE_SIZES;
use backoffice_tui::api_client::RestClient;
use backoffice_tui::config::TuiConfig;
use backoffice_tui::error::TuiError;
use backoffice_tui::events::{Effect, TuiEvent};
use backoffice_tui::persistence;
use backoffice_tui::sources::{load_lookups, ContentReviewSource, StepsSource};
use backoffice_tui::state::App;
use backoffice_tui::telemetry::init_logging;
use backoffice_tui::views::render_view;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let mut config = TuiConfig::load()?;
    init_logging(&config.log_path)?;

    let restored = match persistence::load(&config.persistence_path) {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable UI state");
            None
        }
    };
    if let Some(state) = &restored {
        if PAGE_SIZES.contains(&state.page_size) {
            config.page_size = state.page_size;
        }
    }

    let client = RestClient::new(&config)?;
    tracing::info!(base_url = client.base_url(), page_size = config.page_size, "starting");
    let mut app = App::new(
        config,
        StepsSource::new(client.clone()),
        ContentReviewSource::new(client.clone()),
    );
    if let Some(state) = &restored {
        app.restore(state);
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard {};
    let size = terminal.size()?;
    app.handle_event(TuiEvent::Resize {
        width: size.width,
        height: size.height,
    });

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);

    spawn_input_reader(event_tx.clone());
    spawn_lookups(client, event_tx.clone());
    for effect in app.start() {
        spawn_effect(effect, event_tx.clone());
    }

    let tick_rate = Duration::from_millis(app.config.refresh_interval_ms);
    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        let event = tokio::select! {
            _ = ticker.tick() => TuiEvent::Tick,
            Some(event) = event_rx.recv() => event,
        };
        let update = app.handle_event(event);
        for effect in update.effects {
            spawn_effect(effect, event_tx.clone());
        }
        if update.quit {
            break;
        }
    }

    if let Err(err) = persistence::save(&app.config.persistence_path, &app.persisted_state()) {
        tracing::warn!(error = %err, "failed to save UI state");
    }
    tracing::info!("exiting");

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let forwarded = match evt {
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        Some(TuiEvent::Input(key))
                    }
                    CrosstermEvent::Mouse(mouse) => Some(TuiEvent::Mouse(mouse)),
                    CrosstermEvent::Resize(width, height) => Some(TuiEvent::Resize { width, height }),
                    _ => None,
                };
                if let Some(event) = forwarded {
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Run one effect and feed its result back into the loop.
fn spawn_effect(effect: Effect, sender: mpsc::Sender<TuiEvent>) {
    tokio::spawn(async move {
        let event = effect.await;
        let _ = sender.send(event).await;
    });
}

fn spawn_lookups(client: RestClient, sender: mpsc::Sender<TuiEvent>) {
    tokio::spawn(async move {
        let event = match load_lookups(&client).await {
            Ok(lookups) => TuiEvent::Lookups(Ok(lookups)),
            Err(err) => {
                tracing::warn!(error = %err, "lookup load failed");
                TuiEvent::Lookups(Err(err.to_string()))
            }
        };
        let _ = sender.send(event).await;
    });
}
