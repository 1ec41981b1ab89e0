//! Content view state and data structures for song lists, categories, search and profile

use std::collections::BTreeSet;

use crate::player::Track;
use super::api_client::{Profile, SearchResults};
use super::types::{CategoryKind, SearchResultSection};

/// Tag filters applied to a song list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub emotion: Option<String>,
    pub language: Option<String>,
    pub artist: Option<String>,
}

impl SongFilter {
    pub fn is_empty(&self) -> bool {
        self.emotion.is_none() && self.language.is_none() && self.artist.is_none()
    }

    fn slot(&self, kind: CategoryKind) -> Option<&String> {
        match kind {
            CategoryKind::Emotion => self.emotion.as_ref(),
            CategoryKind::Language => self.language.as_ref(),
            CategoryKind::Artist => self.artist.as_ref(),
        }
    }

    pub fn set(&mut self, kind: CategoryKind, value: String) {
        let slot = match kind {
            CategoryKind::Emotion => &mut self.emotion,
            CategoryKind::Language => &mut self.language,
            CategoryKind::Artist => &mut self.artist,
        };
        *slot = Some(value);
    }

    pub fn matches(&self, track: &Track) -> bool {
        CategoryKind::ALL.iter().all(|kind| match self.slot(*kind) {
            Some(wanted) => kind
                .value_of(track)
                .is_some_and(|value| value.eq_ignore_ascii_case(wanted)),
            None => true,
        })
    }

    /// e.g. "Emotion: Love, Artist: Nila"
    pub fn describe(&self) -> String {
        CategoryKind::ALL
            .iter()
            .filter_map(|kind| self.slot(*kind).map(|v| format!("{}: {}", kind.label(), v)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// An entry of the filter picker
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterOption {
    Clear,
    Value { kind: CategoryKind, value: String },
}

impl FilterOption {
    pub fn label(&self) -> String {
        match self {
            FilterOption::Clear => "Clear filters".to_string(),
            FilterOption::Value { kind, value } => format!("{}: {}", kind.label(), value),
        }
    }
}

/// "Clear" followed by every distinct tag value found in `tracks`, grouped by kind
pub fn filter_options(tracks: &[Track]) -> Vec<FilterOption> {
    let values: BTreeSet<(CategoryKind, String)> = tracks
        .iter()
        .flat_map(|track| {
            CategoryKind::ALL
                .iter()
                .filter_map(move |kind| kind.value_of(track).map(|v| (*kind, v.to_string())))
        })
        .collect();

    std::iter::once(FilterOption::Clear)
        .chain(values.into_iter().map(|(kind, value)| FilterOption::Value { kind, value }))
        .collect()
}

/// Where a song list came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SongListSource {
    AllSongs,
    Category { kind: CategoryKind, value: String },
    Playlist { id: i64 },
}

/// A song list with its filter and selection
#[derive(Clone, Debug)]
pub struct SongList {
    pub source: SongListSource,
    pub title: String,
    pub tracks: Vec<Track>,
    pub filter: SongFilter,
    /// Index into the filtered tracks
    pub selected: usize,
}

impl SongList {
    pub fn new(source: SongListSource, title: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            source,
            title: title.into(),
            tracks,
            filter: SongFilter::default(),
            selected: 0,
        }
    }

    /// Tracks passing the current filter, in list order
    pub fn visible(&self) -> Vec<Track> {
        self.tracks
            .iter()
            .filter(|t| self.filter.matches(t))
            .cloned()
            .collect()
    }

    pub fn apply(&mut self, option: &FilterOption) {
        match option {
            FilterOption::Clear => self.filter = SongFilter::default(),
            FilterOption::Value { kind, value } => self.filter.set(*kind, value.clone()),
        }
        self.selected = 0;
    }

    pub fn playlist_id(&self) -> Option<i64> {
        match self.source {
            SongListSource::Playlist { id } => Some(id),
            _ => None,
        }
    }
}

/// Represents the current view in the main content area
#[derive(Clone, Debug, Default)]
pub enum ContentView {
    #[default]
    Empty,
    Songs(SongList),
    /// Distinct values of one category, e.g. every emotion
    Categories {
        kind: CategoryKind,
        values: Vec<String>,
        selected_index: usize,
    },
    SearchResults {
        query: String,
        results: SearchResults,
        section: SearchResultSection,
        song_index: usize,
        artist_index: usize,
        emotion_index: usize,
        language_index: usize,
    },
    Profile(Profile),
    /// Rendered from the player's queue; only the selection lives here
    Queue { selected_index: usize },
}

/// State for the main content area
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub navigation_stack: Vec<ContentView>,
    pub is_loading: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(id: i64, artist: &str, emotion: &str, language: &str) -> Track {
        let mut track = Track::new(id, format!("Song {}", id), artist, format!("/media/{}.mp3", id));
        track.emotion = Some(emotion.to_string());
        track.language = Some(language.to_string());
        track
    }

    fn sample() -> Vec<Track> {
        vec![
            tagged(1, "Nila", "Love", "Tamil"),
            tagged(2, "Arun", "Happiness", "Hindi"),
            tagged(3, "Nila", "Calmness", "Hindi"),
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let list = SongList::new(SongListSource::AllSongs, "All songs", sample());
        assert_eq!(list.visible().len(), 3);
        assert!(list.filter.is_empty());
    }

    #[test]
    fn filters_combine() {
        let mut list = SongList::new(SongListSource::AllSongs, "All songs", sample());
        list.apply(&FilterOption::Value { kind: CategoryKind::Language, value: "Hindi".to_string() });
        assert_eq!(list.visible().len(), 2);

        list.apply(&FilterOption::Value { kind: CategoryKind::Artist, value: "nila".to_string() });
        let visible = list.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Song 3");
        assert_eq!(list.filter.describe(), "Language: Hindi, Artist: nila");
    }

    #[test]
    fn clear_removes_all_filters_and_resets_selection() {
        let mut list = SongList::new(SongListSource::AllSongs, "All songs", sample());
        list.apply(&FilterOption::Value { kind: CategoryKind::Emotion, value: "Love".to_string() });
        list.selected = 2;
        list.apply(&FilterOption::Clear);

        assert!(list.filter.is_empty());
        assert_eq!(list.visible().len(), 3);
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn untagged_tracks_fail_tag_filters() {
        let mut list = SongList::new(
            SongListSource::AllSongs,
            "All songs",
            vec![Track::new(9, "Bare", "Nila", "/b.mp3")],
        );
        list.apply(&FilterOption::Value { kind: CategoryKind::Emotion, value: "Love".to_string() });
        assert!(list.visible().is_empty());
    }

    #[test]
    fn options_come_from_the_list() {
        let options = filter_options(&sample());

        assert_eq!(options[0], FilterOption::Clear);
        let labels: Vec<String> = options.iter().skip(1).map(FilterOption::label).collect();
        assert_eq!(
            labels,
            vec![
                "Emotion: Calmness",
                "Emotion: Happiness",
                "Emotion: Love",
                "Language: Hindi",
                "Language: Tamil",
                "Artist: Arun",
                "Artist: Nila",
            ]
        );
    }

    #[test]
    fn playlist_lists_know_their_playlist() {
        let list = SongList::new(SongListSource::Playlist { id: 4 }, "Road trip", vec![]);
        assert_eq!(list.playlist_id(), Some(4));
        assert_eq!(SongList::new(SongListSource::AllSongs, "x", vec![]).playlist_id(), None);
    }
}
