//! Navigation-related controller methods (library, categories, search)

use std::collections::BTreeSet;

use crate::model::{
    ActiveSection, CategoryKind, LibraryEntry, SelectedItem, SongList, SongListSource,
};
use super::AppController;

impl AppController {
    /// Run a search in the background; results for an outdated query are dropped.
    pub fn spawn_search(&self, query: String) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.perform_search(&query).await;
        });
    }

    pub async fn perform_search(&self, query: &str) {
        tracing::debug!(query, "Performing search");
        let Some(client) = self.client().await else {
            return;
        };
        self.model.lock().await.set_content_loading(true).await;

        match client.search(query).await {
            Ok(results) => {
                tracing::info!(
                    query,
                    songs = results.songs.len(),
                    artists = results.artists.len(),
                    emotions = results.emotions.len(),
                    languages = results.languages.len(),
                    "Search completed successfully"
                );
                let model = self.model.lock().await;
                if !model.set_search_results(query, results).await {
                    model.set_content_loading(false).await;
                }
            }
            Err(e) => {
                tracing::error!(query, error = %e, "Search failed");
                self.model.lock().await.set_content_loading(false).await;
                self.show_error(&e).await;
            }
        }
    }

    pub async fn open_library_entry(&self, entry: LibraryEntry) {
        tracing::debug!(entry = entry.label(), "Opening library entry");
        let Some(client) = self.client().await else {
            return;
        };
        self.model.lock().await.set_content_loading(true).await;

        let result = match (entry, entry.category()) {
            (LibraryEntry::Profile, _) => client.profile().await.map(LibraryView::Profile),
            (_, Some(kind)) => client
                .all_songs()
                .await
                .map(|songs| LibraryView::categories(kind, &songs)),
            (_, None) => client.all_songs().await.map(|songs| {
                LibraryView::Songs(SongList::new(SongListSource::AllSongs, entry.label(), songs))
            }),
        };

        let model = self.model.lock().await;
        match result {
            Ok(view) => {
                match view {
                    LibraryView::Songs(list) => model.show_songs(list, false).await,
                    LibraryView::Categories(kind, values) => model.show_categories(kind, values).await,
                    LibraryView::Profile(profile) => model.show_profile(profile).await,
                }
                model.set_active_section(ActiveSection::MainContent).await;
            }
            Err(e) => {
                tracing::error!(entry = entry.label(), error = %e, "Failed to open library entry");
                model.set_content_loading(false).await;
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }

    pub async fn open_category(&self, kind: CategoryKind, value: &str) {
        tracing::debug!(kind = ?kind, value, "Opening category");
        let Some(client) = self.client().await else {
            return;
        };
        self.model.lock().await.set_content_loading(true).await;

        match client.category_songs(kind, value).await {
            Ok(songs) => {
                let source = SongListSource::Category {
                    kind,
                    value: value.to_string(),
                };
                let title = format!("{}: {}", kind.label(), value);
                let model = self.model.lock().await;
                model.show_songs(SongList::new(source, title, songs), true).await;
            }
            Err(e) => {
                self.model.lock().await.set_content_loading(false).await;
                self.show_error(&e).await;
            }
        }
    }

    pub async fn handle_selected_item(&self, item: SelectedItem) {
        match item {
            SelectedItem::Song { track, context } => self.play_track(track, context).await,
            SelectedItem::Category { kind, value } => self.open_category(kind, &value).await,
        }
    }
}

enum LibraryView {
    Songs(SongList),
    Categories(CategoryKind, Vec<String>),
    Profile(crate::model::Profile),
}

impl LibraryView {
    /// Distinct values of `kind` across the library, sorted
    fn categories(kind: CategoryKind, songs: &[crate::player::Track]) -> Self {
        let values: BTreeSet<String> = songs
            .iter()
            .filter_map(|song| kind.value_of(song).map(str::to_string))
            .collect();
        LibraryView::Categories(kind, values.into_iter().collect())
    }
}
