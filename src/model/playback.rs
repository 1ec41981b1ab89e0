//! Playback information sampled from the player for rendering

use std::time::Duration;

use crate::player::{PlayerSnapshot, Track};

/// Complete playback information for rendering the UI
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub current: Option<Track>,
    pub is_playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub queue: Vec<Track>,
    pub queue_position: Option<usize>,
    pub device_name: String,
}

impl PlaybackInfo {
    pub fn from_snapshot(
        snapshot: PlayerSnapshot,
        position: Duration,
        duration: Option<Duration>,
        device_name: String,
    ) -> Self {
        Self {
            current: snapshot.current,
            is_playing: snapshot.is_playing,
            position,
            duration,
            queue: snapshot.queue,
            queue_position: snapshot.queue_position,
            device_name,
        }
    }

    /// Position clamped to the known duration
    pub fn progress(&self) -> Duration {
        match self.duration {
            Some(duration) => self.position.min(duration),
            None => self.position,
        }
    }

    /// Gauge ratio in `0.0..=1.0`; zero while the duration is unknown
    pub fn progress_ratio(&self) -> f64 {
        match self.duration {
            Some(duration) if !duration.is_zero() => {
                (self.progress().as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// "3/12" style queue position label
    pub fn queue_label(&self) -> Option<String> {
        self.queue_position
            .map(|index| format!("{}/{}", index + 1, self.queue.len()))
    }
}
