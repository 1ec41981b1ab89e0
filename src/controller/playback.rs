//! Playback control methods

use crate::model::PlaybackInfo;
use crate::player::{PendingStart, PlaybackError, StartOutcome, Track};

use super::AppController;

impl AppController {
    /// Play `track` with the list it was picked from as the new queue.
    ///
    /// An empty `context` keeps the current queue.
    pub async fn play_track(&self, track: Track, context: Vec<Track>) {
        tracing::debug!(track_id = %track.id, title = %track.title, context = context.len(), "Play requested");
        let queue = (!context.is_empty()).then_some(context);
        let result = self.player.request_play(track, queue);
        self.handle_transition(result).await;
    }

    pub async fn toggle_playback(&self) {
        let pending = self.player.toggle_play_pause();
        self.drive_start(pending);
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        let result = self.player.play_next();
        self.handle_transition(result).await;
    }

    pub async fn previous_track(&self) {
        tracing::debug!("Going back to previous track");
        let result = self.player.play_previous();
        self.handle_transition(result).await;
    }

    pub(crate) async fn handle_transition(&self, result: Result<PendingStart, PlaybackError>) {
        match result {
            Ok(pending) => self.drive_start(pending),
            Err(e) => {
                tracing::warn!(error = %e, "Playback request refused");
                self.model.lock().await.set_error(e.to_string()).await;
            }
        }
    }

    /// Await the output's answer in the background and report it.
    pub(crate) fn drive_start(&self, pending: PendingStart) {
        let track = pending.track().cloned();
        let controller = self.clone();

        tokio::spawn(async move {
            let outcome = pending.await;
            match (outcome, track) {
                (StartOutcome::Started, Some(track)) => {
                    tracing::info!(track_id = %track.id, title = %track.title, "Playback started");
                    controller.record_play(&track).await;
                }
                (StartOutcome::Rejected(reason), track) => {
                    let title = track.map(|t| t.title).unwrap_or_default();
                    tracing::warn!(title = %title, reason = %reason, "Playback rejected");
                    let message = if title.is_empty() {
                        format!("Could not start playback: {}", reason)
                    } else {
                        format!("Could not play \"{}\": {}", title, reason)
                    };
                    controller.model.lock().await.set_error(message).await;
                }
                (outcome, _) => {
                    tracing::trace!(?outcome, "Transition settled");
                }
            }
        });
    }

    async fn record_play(&self, track: &Track) {
        let Some(client) = self.client().await else {
            return;
        };
        if let Err(e) = client.record_play(track.id).await {
            tracing::debug!(track_id = %track.id, error = %e, "Could not record play");
        }
    }

    /// Sample the player into the model before each frame.
    pub async fn refresh_playback_info(&self) {
        let info = PlaybackInfo::from_snapshot(
            self.player.snapshot(),
            self.player.position(),
            self.player.duration(),
            self.device_name.clone(),
        );
        self.model.lock().await.update_playback_info(info).await;
    }

    pub async fn show_queue(&self) {
        let position = self.player.snapshot().queue_position;
        let model = self.model.lock().await;
        model.show_queue(position).await;
        model.set_active_section(crate::model::ActiveSection::MainContent).await;
    }
}
