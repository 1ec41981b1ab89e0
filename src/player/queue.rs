//! The ordered context a track was played from

use super::track::{Track, TrackId};

#[derive(Clone, Debug, Default)]
pub struct Queue {
    tracks: Vec<Track>,
    position: Option<usize>,
}

impl Queue {
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Replace the whole queue. Position is unknown until the caller locates
    /// a track in the new sequence.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.position = None;
    }

    /// Point the position at `id`, or clear it if the queue doesn't hold it.
    pub fn locate(&mut self, id: TrackId) -> Option<usize> {
        self.position = self.tracks.iter().position(|t| t.id == id);
        self.position
    }

    pub fn set_position(&mut self, index: usize) {
        self.position = (index < self.tracks.len()).then_some(index);
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Index after the current one, wrapping to the start.
    pub fn next_index(&self) -> Option<usize> {
        let current = self.position?;
        if self.tracks.is_empty() {
            return None;
        }
        Some((current + 1) % self.tracks.len())
    }

    /// Index before the current one, wrapping to the end.
    pub fn previous_index(&self) -> Option<usize> {
        let current = self.position?;
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        Some((current + len - 1) % len)
    }
}
