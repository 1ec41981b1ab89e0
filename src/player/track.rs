//! Playable track as served by the Harmoura backend

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a track, unique within a queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A playable item with display metadata and a source locator.
///
/// The backend has used `src`, `file` and `audio` for the media field over
/// time, so all three are accepted. The locator may be relative to the
/// backend origin; see [`super::Origin`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, alias = "file", alias = "audio")]
    pub src: String,
    #[serde(default, alias = "cover")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl Track {
    pub fn new(id: i64, title: impl Into<String>, artist: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id: TrackId(id),
            title: title.into(),
            artist: artist.into(),
            src: src.into(),
            cover_url: None,
            emotion: None,
            language: None,
        }
    }

    /// "Title - Artist", or just the title when the artist is unknown
    pub fn display_name(&self) -> String {
        if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.artist)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_song() {
        let json = r#"{"id": 4, "title": "Kesariya", "artist": "Arijit Singh", "src": "/media/songs/kesariya.mp3"}"#;
        let track: Track = serde_json::from_str(json).unwrap();

        assert_eq!(track.id, TrackId(4));
        assert_eq!(track.src, "/media/songs/kesariya.mp3");
        assert_eq!(track.cover_url, None);
        assert_eq!(track.emotion, None);
    }

    #[test]
    fn accepts_legacy_source_field_names() {
        let file: Track = serde_json::from_str(r#"{"id": 1, "title": "A", "artist": "X", "file": "/media/a.mp3"}"#).unwrap();
        let audio: Track = serde_json::from_str(r#"{"id": 2, "title": "B", "artist": "Y", "audio": "/media/b.mp3"}"#).unwrap();

        assert_eq!(file.src, "/media/a.mp3");
        assert_eq!(audio.src, "/media/b.mp3");
    }

    #[test]
    fn reads_classification_tags_and_cover() {
        let json = r#"{
            "id": 7, "title": "Calm Waters", "artist": "Nila",
            "src": "/media/songs/calm.mp3", "cover_url": null,
            "emotion": "Calmness", "language": "Tamil"
        }"#;
        let track: Track = serde_json::from_str(json).unwrap();

        assert_eq!(track.emotion.as_deref(), Some("Calmness"));
        assert_eq!(track.language.as_deref(), Some("Tamil"));
        assert_eq!(track.cover_url, None);
    }

    #[test]
    fn missing_source_decodes_as_empty() {
        let track: Track = serde_json::from_str(r#"{"id": 9, "title": "Ghost"}"#).unwrap();
        assert!(track.src.is_empty());
        assert_eq!(track.display_name(), "Ghost");
    }
}
