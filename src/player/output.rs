//! The audio output capability driven by the playback controller

use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;
use tokio::sync::mpsc;

/// Notifications emitted by an [`Output`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputEvent {
    /// The source loaded from `locator` played to its end.
    EndOfTrack { locator: String },
}

pub type OutputEventChannel = mpsc::UnboundedReceiver<OutputEvent>;

/// A single audio output handle.
///
/// `play` is asynchronous and may be rejected; the returned future must not
/// borrow the output so the caller can drive it after other transitions.
pub trait Output: Send + Sync + 'static {
    /// Replace the current source. Does not start playback.
    fn load(&self, locator: &str);

    /// Start or resume the loaded source.
    fn play(&self) -> BoxFuture<'static, Result<()>>;

    fn pause(&self);

    /// Transport position of the loaded source.
    fn position(&self) -> Duration;

    /// Length of the loaded source, once known.
    fn duration(&self) -> Option<Duration>;

    /// Hand out the event channel. Only the first call gets it.
    fn take_event_channel(&self) -> Option<OutputEventChannel>;
}
