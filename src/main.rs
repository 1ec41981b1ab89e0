mod audio;
mod auth;
mod config;
mod controller;
mod logging;
mod model;
mod player;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use chrono::Utc;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rodio::{OutputStreamBuilder, Sink};

use view::AppView;
use audio::AudioBackend;
use config::Config;
use controller::AppController;
use model::{AppModel, HarmouraClient};
use player::{Origin, PlaybackController};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    if let Err(e) = logging::init_logging(&config.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!(base_url = %config.base_url, "=== Harmoura Client Starting ===");

    let http = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;
    let client = HarmouraClient::new(http.clone(), &config.base_url, config.request_timeout());

    // Step 1: Sign in (or register / forget the cached session)
    let session = match std::env::args().nth(1).as_deref() {
        Some("register") => auth::register_account(&client, &config).await?,
        Some("logout") => {
            auth::clear(&config.session_path())?;
            println!("Signed out");
            return Ok(());
        }
        _ => auth::establish_session(&client, &config).await?,
    };
    client.set_access_token(Some(session.access_token.clone())).await;

    // Step 2: Open the audio device; the stream has to outlive the sink
    let mut stream = OutputStreamBuilder::from_default_device()?.open_stream_or_fallback()?;
    stream.log_on_drop(false);
    let sink = Sink::connect_new(stream.mixer());
    let backend = AudioBackend::new(sink, http);
    let device_name = AudioBackend::get_device_name();

    let player = PlaybackController::new(Arc::new(backend), Origin::new(config.base_url.clone()));
    tracing::info!(device = %device_name, origin = player.origin().as_str(), "Player ready");

    let mut app_model = AppModel::new();
    app_model.set_client(client);
    app_model.set_session(session).await;
    let model = Arc::new(Mutex::new(app_model));

    let controller = AppController::new(model.clone(), player.clone(), device_name, config.session_path());

    if let Some(events) = player.take_output_events() {
        controller.start_player_event_listener(events);
    }

    controller.load_user_playlists().await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Harmoura Client shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
    config: &Config,
) -> io::Result<()> {
    let debounce = config.search_debounce();
    let mut last_session_check = Instant::now();

    loop {
        if last_session_check.elapsed() >= SESSION_CHECK_INTERVAL {
            last_session_check = Instant::now();
            let mut model_guard = model.lock().await;
            if model_guard.check_session_expiry(Utc::now()) {
                tracing::warn!("Session expired");
                model_guard
                    .set_error("Session expired. Restart Harmoura to sign in again.".to_string())
                    .await;
            }
        }

        // Fire the search once typing has paused
        let due_search = model.lock().await.take_due_search(debounce).await;
        if let Some(query) = due_search {
            controller.spawn_search(query);
        }

        controller.refresh_playback_info().await;

        // Get current state
        let (playback, ui_state, content_state, should_quit) = {
            let model_guard = model.lock().await;

            model_guard.auto_clear_old_toasts().await;

            (
                model_guard.get_playback_info().await,
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.should_quit().await,
            )
        };

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &content_state);
        })?;

        // Short poll keeps the progress bar moving
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
