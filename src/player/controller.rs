//! Playback controller: the single authority over what is loaded and playing

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;

use super::locator::Origin;
use super::output::{Output, OutputEvent, OutputEventChannel};
use super::queue::Queue;
use super::track::{Track, TrackId};

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("\"{title}\" has no playable source")]
    Unplayable { id: TrackId, title: String },
}

/// What is loaded right now.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loaded { track: Track, playing: bool },
}

/// Read-only view of the controller handed to observers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerSnapshot {
    pub current: Option<Track>,
    pub is_playing: bool,
    pub queue: Vec<Track>,
    pub queue_position: Option<usize>,
}

/// How an asynchronous start settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// The output confirmed playback.
    Started,
    /// The transition was a pause, nothing to wait for.
    Paused,
    /// The output refused to start; the track stays loaded but not playing.
    Rejected(String),
    /// A newer transition happened first; the result was dropped.
    Superseded,
    /// Nothing to do (idle toggle, navigation without a queue position).
    Ignored,
}

/// Completion of a transition that may still be waiting on the output.
///
/// State has already changed when this is returned; awaiting it only applies
/// the output's answer.
#[must_use = "the start result is only applied when this is awaited or spawned"]
pub struct PendingStart {
    track: Option<Track>,
    inner: BoxFuture<'static, StartOutcome>,
}

impl PendingStart {
    fn ready(outcome: StartOutcome) -> Self {
        Self {
            track: None,
            inner: future::ready(outcome).boxed(),
        }
    }

    /// Track being started, if this transition starts one.
    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }
}

impl Future for PendingStart {
    type Output = StartOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<StartOutcome> {
        self.inner.poll_unpin(cx)
    }
}

#[derive(Default)]
struct PlayerState {
    playback: PlaybackState,
    queue: Queue,
    // Advances on every load, pause and resume.
    epoch: u64,
}

impl PlayerState {
    fn current(&self) -> Option<&Track> {
        match &self.playback {
            PlaybackState::Idle => None,
            PlaybackState::Loaded { track, .. } => Some(track),
        }
    }

    fn set_playing(&mut self, value: bool) {
        if let PlaybackState::Loaded { playing, .. } = &mut self.playback {
            *playing = value;
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        let (current, is_playing) = match &self.playback {
            PlaybackState::Idle => (None, false),
            PlaybackState::Loaded { track, playing } => (Some(track.clone()), *playing),
        };
        PlayerSnapshot {
            current,
            is_playing,
            queue: self.queue.tracks().to_vec(),
            queue_position: self.queue.position(),
        }
    }
}

struct Inner {
    output: Arc<dyn Output>,
    origin: Origin,
    state: Mutex<PlayerState>,
    updates: watch::Sender<PlayerSnapshot>,
}

/// Owns the current track, the queue and the output handle.
///
/// Cloning gives another handle to the same controller. Transitions are
/// applied synchronously; only the output's start confirmation is deferred
/// into the returned [`PendingStart`].
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Inner>,
}

impl PlaybackController {
    pub fn new(output: Arc<dyn Output>, origin: Origin) -> Self {
        let (updates, _) = watch::channel(PlayerSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                output,
                origin,
                state: Mutex::new(PlayerState::default()),
                updates,
            }),
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.inner.origin
    }

    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.inner.updates.subscribe()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.inner.updates.borrow().clone()
    }

    pub fn position(&self) -> Duration {
        self.inner.output.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.inner.output.duration()
    }

    pub fn take_output_events(&self) -> Option<OutputEventChannel> {
        self.inner.output.take_event_channel()
    }

    /// Play `track`, optionally from a new queue context.
    ///
    /// Requesting the track that is already loaded toggles play/pause
    /// instead of restarting it.
    pub fn request_play(&self, track: Track, queue: Option<Vec<Track>>) -> Result<PendingStart, PlaybackError> {
        let mut state = self.inner.state.lock();

        if state.current().map(|t| t.id) == Some(track.id) {
            drop(state);
            tracing::debug!(track_id = %track.id, "Track already loaded, toggling instead");
            return Ok(self.toggle_play_pause());
        }

        let locator = self.inner.origin.resolve(&track.src);
        if locator.is_empty() {
            tracing::warn!(track_id = %track.id, title = %track.title, "Rejecting track without a playable source");
            return Err(PlaybackError::Unplayable { id: track.id, title: track.title });
        }

        if let Some(tracks) = queue.filter(|q| !q.is_empty()) {
            tracing::debug!(len = tracks.len(), "Replacing queue");
            state.queue.replace(tracks);
        }
        if state.queue.locate(track.id).is_none() {
            tracing::debug!(track_id = %track.id, "Track not found in queue, position unknown");
        }

        Ok(self.load_and_play(&mut state, track, locator))
    }

    pub fn toggle_play_pause(&self) -> PendingStart {
        let mut state = self.inner.state.lock();

        let (track, playing) = match &state.playback {
            PlaybackState::Idle => return PendingStart::ready(StartOutcome::Ignored),
            PlaybackState::Loaded { track, playing } => (track.clone(), *playing),
        };

        state.epoch += 1;
        if playing {
            self.inner.output.pause();
            state.set_playing(false);
            self.publish(&state);
            tracing::info!(track_id = %track.id, "Playback paused");
            PendingStart::ready(StartOutcome::Paused)
        } else {
            let epoch = state.epoch;
            let start = self.inner.output.play();
            drop(state);
            tracing::debug!(track_id = %track.id, "Resuming playback");
            self.settle_later(start, track, epoch)
        }
    }

    pub fn play_next(&self) -> Result<PendingStart, PlaybackError> {
        self.step(true)
    }

    pub fn play_previous(&self) -> Result<PendingStart, PlaybackError> {
        self.step(false)
    }

    /// React to a notification from the output.
    ///
    /// End of the loaded track advances the queue. Events for a source that
    /// has since been replaced are ignored.
    pub fn handle_output_event(&self, event: OutputEvent) -> Result<Option<PendingStart>, PlaybackError> {
        match event {
            OutputEvent::EndOfTrack { locator } => {
                let mut state = self.inner.state.lock();
                let is_current = matches!(
                    &state.playback,
                    PlaybackState::Loaded { track, playing: true } if track.src == locator
                );
                if !is_current {
                    tracing::debug!(%locator, "Ignoring end of track for a source no longer playing");
                    return Ok(None);
                }
                if state.queue.next_index().is_none() {
                    tracing::debug!("End of track without a queue position, stopping");
                    state.epoch += 1;
                    state.set_playing(false);
                    self.publish(&state);
                    return Ok(None);
                }
                drop(state);
                tracing::debug!(%locator, "End of track, advancing");
                match self.play_next() {
                    Ok(pending) => Ok(Some(pending)),
                    Err(e) => {
                        // The output has drained; nothing is left playing.
                        let mut state = self.inner.state.lock();
                        state.epoch += 1;
                        state.set_playing(false);
                        self.publish(&state);
                        Err(e)
                    }
                }
            }
        }
    }

    fn step(&self, forward: bool) -> Result<PendingStart, PlaybackError> {
        let mut state = self.inner.state.lock();

        let index = if forward {
            state.queue.next_index()
        } else {
            state.queue.previous_index()
        };
        let Some((index, track)) = index.and_then(|i| state.queue.get(i).cloned().map(|t| (i, t))) else {
            tracing::debug!(forward, "No queue position, ignoring navigation");
            return Ok(PendingStart::ready(StartOutcome::Ignored));
        };

        let locator = self.inner.origin.resolve(&track.src);
        if locator.is_empty() {
            tracing::warn!(track_id = %track.id, index, "Queue entry has no playable source");
            return Err(PlaybackError::Unplayable { id: track.id, title: track.title });
        }

        state.queue.set_position(index);
        Ok(self.load_and_play(&mut state, track, locator))
    }

    fn load_and_play(&self, state: &mut PlayerState, mut track: Track, locator: String) -> PendingStart {
        let output = &self.inner.output;
        output.pause();
        output.load(&locator);

        track.src = locator;
        state.epoch += 1;
        let epoch = state.epoch;
        state.playback = PlaybackState::Loaded {
            track: track.clone(),
            playing: true,
        };
        self.publish(state);

        tracing::info!(
            track_id = %track.id,
            title = %track.title,
            position = ?state.queue.position(),
            "Loading track"
        );
        let start = output.play();
        self.settle_later(start, track, epoch)
    }

    fn settle_later(&self, start: BoxFuture<'static, anyhow::Result<()>>, track: Track, epoch: u64) -> PendingStart {
        let controller = self.clone();
        let id = track.id;
        let inner = async move {
            let result = start.await;
            controller.settle(id, epoch, result)
        }
        .boxed();

        PendingStart {
            track: Some(track),
            inner,
        }
    }

    fn settle(&self, id: TrackId, epoch: u64, result: anyhow::Result<()>) -> StartOutcome {
        let mut state = self.inner.state.lock();

        if state.epoch != epoch || state.current().map(|t| t.id) != Some(id) {
            tracing::debug!(track_id = %id, "Discarding superseded start result");
            return StartOutcome::Superseded;
        }

        match result {
            Ok(()) => {
                state.set_playing(true);
                self.publish(&state);
                tracing::debug!(track_id = %id, "Playback confirmed");
                StartOutcome::Started
            }
            Err(e) => {
                state.set_playing(false);
                self.publish(&state);
                tracing::warn!(track_id = %id, error = %e, "Playback start rejected");
                StartOutcome::Rejected(e.to_string())
            }
        }
    }

    fn publish(&self, state: &PlayerState) {
        self.inner.updates.send_replace(state.snapshot());
    }
}
