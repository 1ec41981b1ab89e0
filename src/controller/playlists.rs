//! Playlist management: listing, opening, create, add/remove songs, delete

use crate::model::{ActiveSection, ConfirmAction, Overlay, Playlist, SongList, SongListSource};
use crate::player::{Track, TrackId};
use super::AppController;

impl AppController {
    pub async fn load_user_playlists(&self) {
        let Some(client) = self.client().await else {
            return;
        };

        match client.playlists().await {
            Ok(playlists) => {
                tracing::info!(count = playlists.len(), "Loaded playlists");
                self.model.lock().await.set_playlists(playlists).await;
            }
            Err(e) => self.show_error(&e).await,
        }
    }

    /// Playlists come with their songs, so opening one needs no request.
    pub async fn open_playlist(&self, playlist: Playlist) {
        tracing::debug!(playlist_id = playlist.id, name = %playlist.name, "Opening playlist");
        let model = self.model.lock().await;
        let list = SongList::new(SongListSource::Playlist { id: playlist.id }, playlist.name, playlist.songs);
        model.show_songs(list, false).await;
        model.set_active_section(ActiveSection::MainContent).await;
    }

    pub async fn open_playlist_picker(&self, song: Track) {
        let model = self.model.lock().await;
        if model.get_playlists().await.is_empty() {
            model
                .set_info("No playlists yet. Press c to create one.".to_string())
                .await;
            return;
        }
        model.open_overlay(Overlay::PlaylistPicker { song, selected: 0 }).await;
    }

    pub async fn open_new_playlist_prompt(&self, song_ids: Vec<TrackId>) {
        let model = self.model.lock().await;
        model
            .open_overlay(Overlay::NewPlaylist {
                name: String::new(),
                song_ids,
            })
            .await;
    }

    pub async fn create_playlist(&self, name: String, song_ids: Vec<TrackId>) {
        let Some(client) = self.client().await else {
            return;
        };

        match client.create_playlist(&name, &song_ids).await {
            Ok(playlist) => {
                tracing::info!(playlist_id = playlist.id, name = %playlist.name, "Created playlist");
                let model = self.model.lock().await;
                model.set_info(format!("Created playlist \"{}\"", playlist.name)).await;
                model.replace_playlist(playlist).await;
            }
            Err(e) => self.show_error(&e).await,
        }
    }

    pub async fn add_song_to_playlist(&self, playlist: &Playlist, song: &Track) {
        let Some(client) = self.client().await else {
            return;
        };
        if playlist.songs.iter().any(|s| s.id == song.id) {
            self.model
                .lock()
                .await
                .set_info(format!("\"{}\" is already in \"{}\"", song.title, playlist.name))
                .await;
            return;
        }

        match client.add_song_to_playlist(playlist.id, song.id).await {
            Ok(updated) => {
                let model = self.model.lock().await;
                model
                    .set_info(format!("Added \"{}\" to \"{}\"", song.title, updated.name))
                    .await;
                model.replace_playlist(updated).await;
            }
            Err(e) => self.show_error(&e).await,
        }
    }

    pub async fn remove_song_from_playlist(&self, playlist_id: i64, song_id: TrackId) {
        let Some(client) = self.client().await else {
            return;
        };

        match client.remove_song_from_playlist(playlist_id, song_id).await {
            Ok(updated) => {
                tracing::info!(playlist_id, song_id = %song_id, "Removed song from playlist");
                let model = self.model.lock().await;
                model.set_info(format!("Removed from \"{}\"", updated.name)).await;
                model.replace_playlist(updated).await;
            }
            Err(e) => self.show_error(&e).await,
        }
    }

    pub async fn confirm_delete_playlist(&self) {
        let model = self.model.lock().await;
        if let Some(playlist) = model.get_selected_playlist().await {
            model
                .open_overlay(Overlay::Confirm(ConfirmAction::DeletePlaylist {
                    id: playlist.id,
                    name: playlist.name,
                }))
                .await;
        }
    }

    pub async fn delete_playlist(&self, id: i64, name: &str) {
        let Some(client) = self.client().await else {
            return;
        };

        match client.delete_playlist(id).await {
            Ok(()) => {
                tracing::info!(playlist_id = id, name, "Deleted playlist");
                let model = self.model.lock().await;
                model.remove_playlist(id).await;
                model.set_info(format!("Deleted playlist \"{}\"", name)).await;
            }
            Err(e) => self.show_error(&e).await,
        }
    }
}
