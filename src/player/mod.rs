//! Player module - Playback state machine and queue
//!
//! One [`PlaybackController`] exists per session. Screens hand it a track and
//! optionally the list the track was picked from; the controller decides what
//! the [`Output`] does.
//!
//! - `track`: Playable item and its identity
//! - `queue`: Ordered play context with wraparound navigation
//! - `locator`: Backend origin normalization for media locators
//! - `output`: Audio output capability and its events
//! - `controller`: The playback controller itself

mod track;
mod queue;
mod locator;
mod output;
mod controller;

pub use track::{Track, TrackId};
pub use locator::Origin;
pub use output::{Output, OutputEvent, OutputEventChannel};
pub use controller::{
    PendingStart, PlaybackController, PlaybackError, PlayerSnapshot, StartOutcome,
};
