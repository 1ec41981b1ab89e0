//! Main application model with state management

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::auth::Session;
use crate::player::{Track, TrackId};
use super::api_client::{HarmouraClient, Playlist, Profile, SearchResults};
use super::content::{filter_options, ContentState, ContentView, FilterOption, SongList};
use super::playback::PlaybackInfo;
use super::types::{
    ActiveSection, CategoryKind, LibraryEntry, Overlay, SearchResultSection, SelectedItem, Toast,
    ToastLevel, UiState,
};

/// Main application model containing all state
pub struct AppModel {
    pub client: Option<HarmouraClient>,
    session: Option<Session>,
    session_expiry_reported: bool,
    playback: Arc<Mutex<PlaybackInfo>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            client: None,
            session: None,
            session_expiry_reported: false,
            playback: Arc::new(Mutex::new(PlaybackInfo::default())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_client(&mut self, client: HarmouraClient) {
        self.client = Some(client);
    }

    pub async fn get_client(&self) -> Option<HarmouraClient> {
        self.client.clone()
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub async fn set_session(&mut self, session: Session) {
        self.ui_state.lock().await.username = session.username.clone();
        self.session = Some(session);
        self.session_expiry_reported = false;
    }

    /// True exactly once, on the first check after the session expired.
    pub fn check_session_expiry(&mut self, now: DateTime<Utc>) -> bool {
        let expired = self.session.as_ref().is_some_and(|s| s.is_expired_at(now));
        if expired && !self.session_expiry_reported {
            self.session_expiry_reported = true;
            return true;
        }
        false
    }

    // ========================================================================
    // Playback
    // ========================================================================

    pub async fn update_playback_info(&self, info: PlaybackInfo) {
        *self.playback.lock().await = info;
    }

    pub async fn get_playback_info(&self) -> PlaybackInfo {
        self.playback.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // Sidebar & search
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Library => {
                state.library_selected = state.library_selected.saturating_sub(1);
            }
            ActiveSection::Playlists => {
                state.playlist_selected = state.playlist_selected.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub async fn move_selection_down(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Library => {
                if state.library_selected < state.library_items.len().saturating_sub(1) {
                    state.library_selected += 1;
                }
            }
            ActiveSection::Playlists => {
                if state.playlist_selected < state.playlists.len().saturating_sub(1) {
                    state.playlist_selected += 1;
                }
            }
            _ => {}
        }
    }

    pub async fn get_selected_library_entry(&self) -> Option<LibraryEntry> {
        let state = self.ui_state.lock().await;
        state.library_items.get(state.library_selected).copied()
    }

    pub async fn append_to_search(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.search_query.push(c);
        state.search_edited_at = Some(Instant::now());
    }

    pub async fn backspace_search(&self) {
        let mut state = self.ui_state.lock().await;
        if state.search_query.pop().is_some() {
            state.search_edited_at = Some(Instant::now());
        }
    }

    pub async fn clear_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.clear();
        state.search_edited_at = None;
    }

    /// Query whose debounce window has passed. Fires once per burst of edits.
    pub async fn take_due_search(&self, debounce: Duration) -> Option<String> {
        let mut state = self.ui_state.lock().await;
        let edited_at = state.search_edited_at?;
        if edited_at.elapsed() < debounce {
            return None;
        }
        state.search_edited_at = None;
        let query = state.search_query.trim().to_string();
        (!query.is_empty()).then_some(query)
    }

    /// Skip the debounce, e.g. on Enter.
    pub async fn take_search_now(&self) -> Option<String> {
        let mut state = self.ui_state.lock().await;
        state.search_edited_at = None;
        let query = state.search_query.trim().to_string();
        (!query.is_empty()).then_some(query)
    }

    pub async fn current_search_query(&self) -> String {
        self.ui_state.lock().await.search_query.trim().to_string()
    }

    // ========================================================================
    // Playlists
    // ========================================================================

    pub async fn set_playlists(&self, playlists: Vec<Playlist>) {
        let mut state = self.ui_state.lock().await;
        state.playlists = playlists;
        state.playlist_selected = state
            .playlist_selected
            .min(state.playlists.len().saturating_sub(1));
    }

    pub async fn get_selected_playlist(&self) -> Option<Playlist> {
        let state = self.ui_state.lock().await;
        state.playlists.get(state.playlist_selected).cloned()
    }

    pub async fn get_playlists(&self) -> Vec<Playlist> {
        self.ui_state.lock().await.playlists.clone()
    }

    /// Store an updated playlist and refresh it if it is on screen.
    pub async fn replace_playlist(&self, playlist: Playlist) {
        {
            let mut state = self.ui_state.lock().await;
            match state.playlists.iter_mut().find(|p| p.id == playlist.id) {
                Some(existing) => *existing = playlist.clone(),
                None => state.playlists.push(playlist.clone()),
            }
        }

        let mut content = self.content_state.lock().await;
        if let ContentView::Songs(list) = &mut content.view {
            if list.playlist_id() == Some(playlist.id) {
                list.title = playlist.name.clone();
                list.tracks = playlist.songs;
                list.selected = list.selected.min(list.visible().len().saturating_sub(1));
            }
        }
    }

    /// Drop a deleted playlist, leaving its song list if it was open.
    pub async fn remove_playlist(&self, id: i64) {
        {
            let mut state = self.ui_state.lock().await;
            state.playlists.retain(|p| p.id != id);
            state.playlist_selected = state
                .playlist_selected
                .min(state.playlists.len().saturating_sub(1));
        }

        let mut content = self.content_state.lock().await;
        let open = matches!(&content.view, ContentView::Songs(list) if list.playlist_id() == Some(id));
        if open {
            content.view = content.navigation_stack.pop().unwrap_or_default();
        }
        content
            .navigation_stack
            .retain(|view| !matches!(view, ContentView::Songs(list) if list.playlist_id() == Some(id)));
    }

    // ========================================================================
    // Toasts
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        self.set_toast(message, ToastLevel::Error).await;
    }

    pub async fn set_info(&self, message: String) {
        self.set_toast(message, ToastLevel::Info).await;
    }

    async fn set_toast(&self, message: String, level: ToastLevel) {
        let mut state = self.ui_state.lock().await;
        state.toast = Some(Toast {
            message,
            level,
            created: Instant::now(),
        });
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        if state.toast.as_ref().is_some_and(|t| t.level == ToastLevel::Error) {
            state.toast = None;
        }
    }

    pub async fn has_error(&self) -> bool {
        let state = self.ui_state.lock().await;
        state.toast.as_ref().is_some_and(|t| t.level == ToastLevel::Error)
    }

    pub async fn auto_clear_old_toasts(&self) {
        let mut state = self.ui_state.lock().await;
        if state.toast.as_ref().is_some_and(Toast::is_expired) {
            state.toast = None;
        }
    }

    // ========================================================================
    // Overlays
    // ========================================================================

    pub async fn open_overlay(&self, overlay: Overlay) {
        self.ui_state.lock().await.overlay = Some(overlay);
    }

    pub async fn close_overlay(&self) {
        self.ui_state.lock().await.overlay = None;
    }

    pub async fn get_overlay(&self) -> Option<Overlay> {
        self.ui_state.lock().await.overlay.clone()
    }

    pub async fn overlay_move(&self, down: bool) {
        let mut state = self.ui_state.lock().await;
        let playlist_count = state.playlists.len();
        let (selected, len) = match &mut state.overlay {
            Some(Overlay::PlaylistPicker { selected, .. }) => (selected, playlist_count),
            Some(Overlay::FilterPicker { options, selected }) => {
                let len = options.len();
                (selected, len)
            }
            _ => return,
        };
        if down {
            if *selected < len.saturating_sub(1) {
                *selected += 1;
            }
        } else {
            *selected = selected.saturating_sub(1);
        }
    }

    pub async fn overlay_input(&self, c: Option<char>) {
        let mut state = self.ui_state.lock().await;
        if let Some(Overlay::NewPlaylist { name, .. }) = &mut state.overlay {
            match c {
                Some(c) => name.push(c),
                None => {
                    name.pop();
                }
            }
        }
    }

    /// Open the filter picker for the song list on screen.
    pub async fn open_filter_picker(&self) -> bool {
        let tracks = match &self.content_state.lock().await.view {
            ContentView::Songs(list) => list.tracks.clone(),
            _ => return false,
        };
        self.open_overlay(Overlay::FilterPicker {
            options: filter_options(&tracks),
            selected: 0,
        })
        .await;
        true
    }

    pub async fn apply_filter(&self, option: &FilterOption) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Songs(list) = &mut state.view {
            list.apply(option);
        }
    }

    // ========================================================================
    // Content views
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_content_loading(&self, loading: bool) {
        let mut state = self.content_state.lock().await;
        state.is_loading = loading;
    }

    fn push_view(state: &mut ContentState, view: ContentView, keep_history: bool) {
        if keep_history {
            if !matches!(state.view, ContentView::Empty) {
                let previous_view = std::mem::take(&mut state.view);
                state.navigation_stack.push(previous_view);
            }
        } else {
            state.navigation_stack.clear();
        }
        state.view = view;
        state.is_loading = false;
    }

    /// Show a song list; `keep_history` when drilled into from another view.
    pub async fn show_songs(&self, list: SongList, keep_history: bool) {
        let mut state = self.content_state.lock().await;
        Self::push_view(&mut state, ContentView::Songs(list), keep_history);
    }

    pub async fn show_categories(&self, kind: CategoryKind, values: Vec<String>) {
        let mut state = self.content_state.lock().await;
        let view = ContentView::Categories {
            kind,
            values,
            selected_index: 0,
        };
        Self::push_view(&mut state, view, false);
    }

    /// Apply results for `query` unless the user has typed something else since.
    pub async fn set_search_results(&self, query: &str, results: SearchResults) -> bool {
        if self.current_search_query().await != query {
            tracing::debug!(query, "Discarding stale search results");
            return false;
        }

        let section = if results.songs.is_empty() {
            [
                (SearchResultSection::Artists, results.artists.is_empty()),
                (SearchResultSection::Emotions, results.emotions.is_empty()),
                (SearchResultSection::Languages, results.languages.is_empty()),
            ]
            .into_iter()
            .find(|(_, empty)| !empty)
            .map(|(section, _)| section)
            .unwrap_or_default()
        } else {
            SearchResultSection::Songs
        };

        let mut state = self.content_state.lock().await;
        let view = ContentView::SearchResults {
            query: query.to_string(),
            results,
            section,
            song_index: 0,
            artist_index: 0,
            emotion_index: 0,
            language_index: 0,
        };
        Self::push_view(&mut state, view, false);
        true
    }

    pub async fn show_profile(&self, profile: Profile) {
        let mut state = self.content_state.lock().await;
        Self::push_view(&mut state, ContentView::Profile(profile), false);
    }

    pub async fn show_queue(&self, current_position: Option<usize>) {
        let mut state = self.content_state.lock().await;
        if matches!(state.view, ContentView::Queue { .. }) {
            return;
        }
        let view = ContentView::Queue {
            selected_index: current_position.unwrap_or(0),
        };
        Self::push_view(&mut state, view, true);
    }

    pub async fn navigate_back(&self) -> bool {
        let mut state = self.content_state.lock().await;
        if let Some(previous_view) = state.navigation_stack.pop() {
            state.view = previous_view;
            true
        } else {
            state.view = ContentView::Empty;
            false
        }
    }

    pub async fn navigate_search_section(&self, forward: bool) {
        let mut state = self.content_state.lock().await;
        if let ContentView::SearchResults { section, .. } = &mut state.view {
            *section = if forward { section.next() } else { section.prev() };
        }
    }

    pub async fn content_move(&self, down: bool) {
        let queue_len = self.playback.lock().await.queue.len();
        let mut state = self.content_state.lock().await;
        let (idx, len) = match &mut state.view {
            ContentView::Songs(list) => {
                let len = list.visible().len();
                (&mut list.selected, len)
            }
            ContentView::Categories {
                values,
                selected_index,
                ..
            } => (selected_index, values.len()),
            ContentView::SearchResults {
                results,
                section,
                song_index,
                artist_index,
                emotion_index,
                language_index,
                ..
            } => match section {
                SearchResultSection::Songs => (song_index, results.songs.len()),
                SearchResultSection::Artists => (artist_index, results.artists.len()),
                SearchResultSection::Emotions => (emotion_index, results.emotions.len()),
                SearchResultSection::Languages => (language_index, results.languages.len()),
            },
            ContentView::Queue { selected_index } => (selected_index, queue_len),
            ContentView::Profile(_) | ContentView::Empty => return,
        };

        if down {
            if *idx < len.saturating_sub(1) {
                *idx += 1;
            }
        } else {
            *idx = idx.saturating_sub(1);
        }
    }

    pub async fn get_selected_content_item(&self) -> Option<SelectedItem> {
        let queue = self.playback.lock().await.queue.clone();
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::Songs(list) => {
                let visible = list.visible();
                visible.get(list.selected).cloned().map(|track| SelectedItem::Song {
                    track,
                    context: visible,
                })
            }
            ContentView::Categories {
                kind,
                values,
                selected_index,
            } => values.get(*selected_index).map(|value| SelectedItem::Category {
                kind: *kind,
                value: value.clone(),
            }),
            ContentView::SearchResults {
                results,
                section,
                song_index,
                artist_index,
                emotion_index,
                language_index,
                ..
            } => {
                let (values, index) = match section {
                    SearchResultSection::Songs => {
                        return results.songs.get(*song_index).cloned().map(|track| SelectedItem::Song {
                            track,
                            context: results.songs.clone(),
                        });
                    }
                    SearchResultSection::Artists => (&results.artists, *artist_index),
                    SearchResultSection::Emotions => (&results.emotions, *emotion_index),
                    SearchResultSection::Languages => (&results.languages, *language_index),
                };
                let kind = section.category()?;
                values.get(index).map(|value| SelectedItem::Category {
                    kind,
                    value: value.clone(),
                })
            }
            ContentView::Queue { selected_index } => {
                // Empty context: play within the existing queue
                queue.get(*selected_index).cloned().map(|track| SelectedItem::Song {
                    track,
                    context: Vec::new(),
                })
            }
            ContentView::Profile(_) | ContentView::Empty => None,
        }
    }

    /// Selected song and the playlist it belongs to, when a playlist is open
    pub async fn get_selected_playlist_song(&self) -> Option<(i64, TrackId)> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::Songs(list) => {
                let playlist_id = list.playlist_id()?;
                let track = list.visible().get(list.selected).map(|t| t.id)?;
                Some((playlist_id, track))
            }
            _ => None,
        }
    }

    pub async fn get_selected_track(&self) -> Option<Track> {
        match self.get_selected_content_item().await? {
            SelectedItem::Song { track, .. } => Some(track),
            SelectedItem::Category { .. } => None,
        }
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SongListSource;

    fn songs(ids: &[i64]) -> Vec<Track> {
        ids.iter()
            .map(|id| Track::new(*id, format!("Song {}", id), "Nila", format!("/media/{}.mp3", id)))
            .collect()
    }

    async fn type_query(model: &AppModel, query: &str) {
        for c in query.chars() {
            model.append_to_search(c).await;
        }
    }

    #[tokio::test]
    async fn search_waits_for_debounce() {
        let model = AppModel::new();
        type_query(&model, "nil").await;

        assert_eq!(model.take_due_search(Duration::from_secs(60)).await, None);
        assert_eq!(model.take_due_search(Duration::ZERO).await.as_deref(), Some("nil"));
        // Already fired for this burst of typing
        assert_eq!(model.take_due_search(Duration::ZERO).await, None);
    }

    #[tokio::test]
    async fn enter_fires_immediately_and_cancels_pending_debounce() {
        let model = AppModel::new();
        type_query(&model, "love").await;

        assert_eq!(model.take_search_now().await.as_deref(), Some("love"));
        assert_eq!(model.take_due_search(Duration::ZERO).await, None);
    }

    #[tokio::test]
    async fn blank_query_never_fires() {
        let model = AppModel::new();
        type_query(&model, "  ").await;
        assert_eq!(model.take_due_search(Duration::ZERO).await, None);
    }

    #[tokio::test]
    async fn stale_search_results_are_discarded() {
        let model = AppModel::new();
        type_query(&model, "ni").await;
        type_query(&model, "la").await;

        let stale = SearchResults {
            songs: songs(&[1]),
            ..Default::default()
        };
        assert!(!model.set_search_results("ni", stale).await);
        assert!(matches!(model.get_content_state().await.view, ContentView::Empty));

        let fresh = SearchResults {
            artists: vec!["Nila".to_string()],
            ..Default::default()
        };
        assert!(model.set_search_results("nila", fresh).await);
        match model.get_content_state().await.view {
            ContentView::SearchResults { section, .. } => {
                assert_eq!(section, SearchResultSection::Artists)
            }
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[tokio::test]
    async fn selecting_a_song_carries_its_list() {
        let model = AppModel::new();
        model
            .show_songs(SongList::new(SongListSource::AllSongs, "All songs", songs(&[1, 2, 3])), false)
            .await;
        model.content_move(true).await;

        match model.get_selected_content_item().await {
            Some(SelectedItem::Song { track, context }) => {
                assert_eq!(track.id, TrackId(2));
                assert_eq!(context.len(), 3);
            }
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[tokio::test]
    async fn filter_narrows_the_queue_context() {
        let model = AppModel::new();
        let mut tracks = songs(&[1, 2, 3]);
        tracks[1].emotion = Some("Love".to_string());
        model
            .show_songs(SongList::new(SongListSource::AllSongs, "All songs", tracks), false)
            .await;

        assert!(model.open_filter_picker().await);
        model
            .apply_filter(&FilterOption::Value {
                kind: CategoryKind::Emotion,
                value: "Love".to_string(),
            })
            .await;

        match model.get_selected_content_item().await {
            Some(SelectedItem::Song { track, context }) => {
                assert_eq!(track.id, TrackId(2));
                assert_eq!(context.len(), 1);
            }
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[tokio::test]
    async fn navigation_stack_restores_previous_view() {
        let model = AppModel::new();
        model
            .show_categories(CategoryKind::Emotion, vec!["Love".to_string(), "Calmness".to_string()])
            .await;
        model
            .show_songs(
                SongList::new(
                    SongListSource::Category {
                        kind: CategoryKind::Emotion,
                        value: "Love".to_string(),
                    },
                    "Love",
                    songs(&[4]),
                ),
                true,
            )
            .await;

        assert!(model.navigate_back().await);
        assert!(matches!(
            model.get_content_state().await.view,
            ContentView::Categories { .. }
        ));
        assert!(!model.navigate_back().await);
        assert!(matches!(model.get_content_state().await.view, ContentView::Empty));
    }

    #[tokio::test]
    async fn playlist_updates_refresh_the_open_list() {
        let model = AppModel::new();
        let playlist = Playlist {
            id: 7,
            name: "Road trip".to_string(),
            songs: songs(&[1, 2]),
            created_at: None,
        };
        model.set_playlists(vec![playlist.clone()]).await;
        model
            .show_songs(
                SongList::new(SongListSource::Playlist { id: 7 }, "Road trip", playlist.songs.clone()),
                false,
            )
            .await;
        model.content_move(true).await;
        assert_eq!(model.get_selected_playlist_song().await, Some((7, TrackId(2))));

        model
            .replace_playlist(Playlist {
                songs: songs(&[1]),
                ..playlist
            })
            .await;
        assert_eq!(model.get_selected_playlist_song().await, Some((7, TrackId(1))));

        model.remove_playlist(7).await;
        assert!(model.get_playlists().await.is_empty());
        assert!(matches!(model.get_content_state().await.view, ContentView::Empty));
    }

    #[tokio::test]
    async fn errors_are_cleared_but_info_survives_clear_error() {
        let model = AppModel::new();
        model.set_error("boom".to_string()).await;
        assert!(model.has_error().await);
        model.clear_error().await;
        assert!(!model.has_error().await);

        model.set_info("Saved".to_string()).await;
        model.clear_error().await;
        assert!(model.get_ui_state().await.toast.is_some());
    }

    #[tokio::test]
    async fn session_expiry_is_reported_once() {
        let mut model = AppModel::new();
        let now = Utc::now();
        model
            .set_session(Session {
                username: "asha".to_string(),
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
                expires_at: now + chrono::Duration::minutes(5),
                remember_me: false,
            })
            .await;

        assert!(!model.check_session_expiry(now));
        assert!(model.check_session_expiry(now + chrono::Duration::minutes(6)));
        assert!(!model.check_session_expiry(now + chrono::Duration::minutes(7)));
        assert_eq!(model.get_ui_state().await.username, "asha");
    }
}
