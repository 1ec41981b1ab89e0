//! Core type definitions for the application

use std::time::{Duration, Instant};

use crate::player::{Track, TrackId};
use super::api_client::Playlist;
use super::content::FilterOption;

/// How long a toast stays on screen
pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Library,
    Playlists,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Library,
            ActiveSection::Library => ActiveSection::Playlists,
            ActiveSection::Playlists => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::Library => ActiveSection::Search,
            ActiveSection::Playlists => ActiveSection::Library,
            ActiveSection::MainContent => ActiveSection::Playlists,
        }
    }
}

/// An entry of the Library section
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryEntry {
    AllSongs,
    Emotions,
    Languages,
    Artists,
    Profile,
}

impl LibraryEntry {
    pub const ALL: [LibraryEntry; 5] = [
        LibraryEntry::AllSongs,
        LibraryEntry::Emotions,
        LibraryEntry::Languages,
        LibraryEntry::Artists,
        LibraryEntry::Profile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LibraryEntry::AllSongs => "All songs",
            LibraryEntry::Emotions => "Emotions",
            LibraryEntry::Languages => "Languages",
            LibraryEntry::Artists => "Artists",
            LibraryEntry::Profile => "Profile",
        }
    }

    /// Category whose values this entry lists
    pub fn category(self) -> Option<CategoryKind> {
        match self {
            LibraryEntry::Emotions => Some(CategoryKind::Emotion),
            LibraryEntry::Languages => Some(CategoryKind::Language),
            LibraryEntry::Artists => Some(CategoryKind::Artist),
            LibraryEntry::AllSongs | LibraryEntry::Profile => None,
        }
    }
}

/// A tag songs can be browsed and filtered by
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryKind {
    Emotion,
    Language,
    Artist,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 3] = [CategoryKind::Emotion, CategoryKind::Language, CategoryKind::Artist];

    /// Path segment of the backend's browse endpoint
    pub fn path_segment(self) -> &'static str {
        match self {
            CategoryKind::Emotion => "emotion",
            CategoryKind::Language => "language",
            CategoryKind::Artist => "artist",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryKind::Emotion => "Emotion",
            CategoryKind::Language => "Language",
            CategoryKind::Artist => "Artist",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            CategoryKind::Emotion => "Emotions",
            CategoryKind::Language => "Languages",
            CategoryKind::Artist => "Artists",
        }
    }

    /// The track's value for this tag, if tagged
    pub fn value_of(self, track: &Track) -> Option<&str> {
        let value = match self {
            CategoryKind::Emotion => track.emotion.as_deref(),
            CategoryKind::Language => track.language.as_deref(),
            CategoryKind::Artist => Some(track.artist.as_str()),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Which section of search results is selected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchResultSection {
    #[default]
    Songs,
    Artists,
    Emotions,
    Languages,
}

impl SearchResultSection {
    pub fn next(self) -> Self {
        match self {
            Self::Songs => Self::Artists,
            Self::Artists => Self::Emotions,
            Self::Emotions => Self::Languages,
            Self::Languages => Self::Songs,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Songs => Self::Languages,
            Self::Artists => Self::Songs,
            Self::Emotions => Self::Artists,
            Self::Languages => Self::Emotions,
        }
    }

    /// Category browsed when a value in this section is opened
    pub fn category(self) -> Option<CategoryKind> {
        match self {
            Self::Songs => None,
            Self::Artists => Some(CategoryKind::Artist),
            Self::Emotions => Some(CategoryKind::Emotion),
            Self::Languages => Some(CategoryKind::Language),
        }
    }
}

/// Represents a selected item for action handling
#[derive(Clone, Debug)]
pub enum SelectedItem {
    /// A song together with the list it was picked from
    Song { track: Track, context: Vec<Track> },
    Category { kind: CategoryKind, value: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub created: Instant,
}

impl Toast {
    pub fn is_expired(&self) -> bool {
        self.created.elapsed() > TOAST_LIFETIME
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    DeletePlaylist { id: i64, name: String },
    SignOut,
}

impl ConfirmAction {
    pub fn prompt(&self) -> String {
        match self {
            ConfirmAction::DeletePlaylist { name, .. } => format!("Delete playlist \"{}\"?", name),
            ConfirmAction::SignOut => "Sign out and forget this session?".to_string(),
        }
    }
}

/// Modal popup drawn over the main layout; captures all keys while open
#[derive(Clone, Debug)]
pub enum Overlay {
    Help,
    PlaylistPicker { song: Track, selected: usize },
    FilterPicker { options: Vec<FilterOption>, selected: usize },
    NewPlaylist { name: String, song_ids: Vec<TrackId> },
    Confirm(ConfirmAction),
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    /// Set on every edit of the query, cleared once the search fires
    pub search_edited_at: Option<Instant>,
    pub library_items: Vec<LibraryEntry>,
    pub library_selected: usize,
    pub playlists: Vec<Playlist>,
    pub playlist_selected: usize,
    pub toast: Option<Toast>,
    pub overlay: Option<Overlay>,
    pub username: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Library,
            search_query: String::new(),
            search_edited_at: None,
            library_items: LibraryEntry::ALL.to_vec(),
            library_selected: 0,
            playlists: vec![],
            playlist_selected: 0,
            toast: None,
            overlay: None,
            username: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_cycle_both_ways() {
        let mut section = ActiveSection::Search;
        for _ in 0..4 {
            section = section.next();
        }
        assert_eq!(section, ActiveSection::Search);
        assert_eq!(ActiveSection::Search.prev(), ActiveSection::MainContent);

        assert_eq!(SearchResultSection::Languages.next(), SearchResultSection::Songs);
        assert_eq!(SearchResultSection::Songs.prev(), SearchResultSection::Languages);
    }

    #[test]
    fn category_values_skip_blank_tags() {
        let mut track = Track::new(1, "A", "  Nila ", "/a.mp3");
        track.emotion = Some("Love".to_string());
        track.language = Some("   ".to_string());

        assert_eq!(CategoryKind::Artist.value_of(&track), Some("Nila"));
        assert_eq!(CategoryKind::Emotion.value_of(&track), Some("Love"));
        assert_eq!(CategoryKind::Language.value_of(&track), None);
    }
}
