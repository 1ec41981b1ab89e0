//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and hands playback requests to
//! the player. It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Playback control methods
//! - `navigation`: Library/category/search navigation
//! - `playlists`: Playlist management
//! - `player_events`: Output event listener

mod input;
mod playback;
mod navigation;
mod playlists;
mod player_events;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::model::{AppModel, HarmouraClient};
use crate::player::PlaybackController;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) player: PlaybackController,
    device_name: String,
    session_path: PathBuf,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        player: PlaybackController,
        device_name: String,
        session_path: PathBuf,
    ) -> Self {
        Self {
            model,
            player,
            device_name,
            session_path,
        }
    }

    /// Clone of the backend client, so requests run without holding the model lock
    pub(crate) async fn client(&self) -> Option<HarmouraClient> {
        self.model.lock().await.get_client().await
    }

    pub(crate) async fn show_error(&self, error: &anyhow::Error) {
        let message = Self::format_error(error);
        self.model.lock().await.set_error(message).await;
    }

    /// Forget the cached session and quit.
    pub async fn sign_out(&self) {
        if let Err(e) = crate::auth::clear(&self.session_path) {
            tracing::warn!(error = %e, "Could not remove cached session");
        }
        tracing::info!("Signed out");
        self.model.lock().await.set_should_quit(true).await;
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        let transport = error.chain().find_map(|e| e.downcast_ref::<reqwest::Error>());
        if let Some(e) = transport {
            if e.is_connect() {
                return "Cannot reach the Harmoura server. Is it running?".to_string();
            }
            if e.is_timeout() {
                return "The server took too long to answer.".to_string();
            }
        }

        let error_str = error.to_string();
        // Backend failures read "<status> <message>"
        let status = error_str
            .split_whitespace()
            .next()
            .and_then(|s| s.parse::<u16>().ok());

        match status {
            Some(401) => "Session expired. Restart Harmoura to sign in again.".to_string(),
            Some(404) => "Not found on the server.".to_string(),
            Some(500..=599) => format!("Server error: {}", error_str),
            _ => format!("Error: {}", error_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn maps_backend_statuses_to_messages() {
        assert_eq!(
            AppController::format_error(&anyhow!("401 Given token not valid")),
            "Session expired. Restart Harmoura to sign in again."
        );
        assert_eq!(
            AppController::format_error(&anyhow!("404 Playlist not found")),
            "Not found on the server."
        );
        assert_eq!(
            AppController::format_error(&anyhow!("500 request failed")),
            "Server error: 500 request failed"
        );
        assert_eq!(
            AppController::format_error(&anyhow!("Playlist name is required")),
            "Error: Playlist name is required"
        );
    }
}
