//! Output event listener: end-of-track drives auto-advance

use crate::player::OutputEventChannel;
use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut event_channel: OutputEventChannel) {
        let controller = self.clone();
        tracing::info!("Starting output event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                if controller.model.lock().await.should_quit().await {
                    tracing::debug!("Output event listener shutting down");
                    break;
                }

                tracing::debug!(?event, "Output event");
                match controller.player.handle_output_event(event) {
                    Ok(Some(pending)) => controller.drive_start(pending),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Auto-advance stopped");
                        controller.model.lock().await.set_error(e.to_string()).await;
                    }
                }
            }
            tracing::debug!("Output event channel closed");
        });
    }
}
