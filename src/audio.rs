//! Local audio output backed by rodio
//!
//! Media is downloaded from the backend in full, decoded and appended to a
//! single sink. A watcher task reports when the sink runs dry.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use rodio::{Decoder, Sink, Source};
use tokio::sync::mpsc;

use crate::player::{Output, OutputEvent, OutputEventChannel};

const DEVICE_NAME: &str = "Harmoura";
const END_OF_TRACK_POLL: Duration = Duration::from_millis(250);

#[derive(Default)]
struct SourceState {
    locator: String,
    // Bumped by every load; a download finishing under an older generation is dropped.
    generation: u64,
    // Bumped by every play and pause; a download only starts the sink if no
    // newer play/pause intent arrived meanwhile.
    intent: u64,
    appended: bool,
    end_reported: bool,
    duration: Option<Duration>,
    last_download: Option<(String, Arc<[u8]>)>,
}

pub struct AudioBackend {
    sink: Arc<Sink>,
    http: reqwest::Client,
    state: Arc<Mutex<SourceState>>,
    event_channel: Mutex<Option<OutputEventChannel>>,
}

impl AudioBackend {
    /// Wrap a sink connected to an open output stream.
    ///
    /// Must be called inside the tokio runtime: it spawns the end-of-track
    /// watcher.
    pub fn new(sink: Sink, http: reqwest::Client) -> Self {
        let sink = Arc::new(sink);
        sink.pause();
        let state = Arc::new(Mutex::new(SourceState::default()));
        let (events, event_channel) = mpsc::unbounded_channel();

        Self::spawn_end_of_track_watcher(sink.clone(), state.clone(), events);

        Self {
            sink,
            http,
            state,
            event_channel: Mutex::new(Some(event_channel)),
        }
    }

    pub fn get_device_name() -> String {
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        format!("{}@{}", DEVICE_NAME, hostname)
    }

    fn spawn_end_of_track_watcher(
        sink: Arc<Sink>,
        state: Arc<Mutex<SourceState>>,
        events: mpsc::UnboundedSender<OutputEvent>,
    ) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(END_OF_TRACK_POLL);
            loop {
                ticker.tick().await;

                let ended = {
                    let mut state = state.lock();
                    if state.appended && !state.end_reported && sink.empty() {
                        state.end_reported = true;
                        Some(state.locator.clone())
                    } else {
                        None
                    }
                };

                if let Some(locator) = ended {
                    tracing::debug!(%locator, "Sink drained");
                    if events.send(OutputEvent::EndOfTrack { locator }).is_err() {
                        tracing::debug!("Output event receiver dropped, stopping watcher");
                        break;
                    }
                }
            }
        });
    }
}

async fn download(http: &reqwest::Client, locator: &str) -> Result<Arc<[u8]>> {
    tracing::debug!(%locator, "Downloading media");
    let response = http
        .get(locator)
        .send()
        .await
        .with_context(|| format!("Could not reach {}", locator))?
        .error_for_status()?;
    let bytes = response.bytes().await?;
    tracing::debug!(%locator, size = bytes.len(), "Media downloaded");
    Ok(Arc::from(bytes.as_ref()))
}

impl Output for AudioBackend {
    fn load(&self, locator: &str) {
        let mut state = self.state.lock();
        self.sink.clear();
        state.locator = locator.to_string();
        state.generation += 1;
        state.appended = false;
        state.end_reported = false;
        state.duration = None;
    }

    fn play(&self) -> BoxFuture<'static, Result<()>> {
        let sink = self.sink.clone();
        let http = self.http.clone();
        let state = self.state.clone();

        let (locator, generation, intent, appended, cached) = {
            let mut s = state.lock();
            s.intent += 1;
            // A drained sink has nothing left to resume; append the source again.
            if s.appended && sink.empty() {
                s.appended = false;
                s.end_reported = false;
            }
            let cached = s
                .last_download
                .as_ref()
                .filter(|(locator, _)| *locator == s.locator)
                .map(|(_, bytes)| bytes.clone());
            (s.locator.clone(), s.generation, s.intent, s.appended, cached)
        };

        if appended {
            sink.play();
            return futures::future::ready(Ok(())).boxed();
        }

        async move {
            if locator.is_empty() {
                return Err(anyhow!("Nothing loaded"));
            }

            let bytes = match cached {
                Some(bytes) => bytes,
                None => download(&http, &locator).await?,
            };
            let source = Decoder::new(Cursor::new(bytes.clone()))
                .map_err(|e| anyhow!("Could not decode audio: {}", e))?;
            let duration = source.total_duration();

            let mut s = state.lock();
            if s.generation != generation {
                return Err(anyhow!("Source replaced before playback started"));
            }
            // An earlier play of this generation may have appended already.
            if !s.appended {
                sink.append(source);
                s.appended = true;
                s.duration = duration;
                s.last_download = Some((locator, bytes));
            }
            if s.intent == intent {
                sink.play();
            }
            Ok(())
        }
        .boxed()
    }

    fn pause(&self) {
        let mut state = self.state.lock();
        state.intent += 1;
        self.sink.pause();
    }

    fn position(&self) -> Duration {
        if self.state.lock().appended {
            self.sink.get_pos()
        } else {
            Duration::ZERO
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.state.lock().duration
    }

    fn take_event_channel(&self) -> Option<OutputEventChannel> {
        self.event_channel.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATOR: &str = "http://127.0.0.1:8000/media/songs/1.wav";

    /// A short silent mono 16-bit PCM WAV
    fn wav_bytes() -> Arc<[u8]> {
        let samples: u32 = 800;
        let data_len = samples * 2;
        let mut wav = Vec::with_capacity(44 + data_len as usize);
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVEfmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&8000u32.to_le_bytes());
        wav.extend_from_slice(&16000u32.to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        wav.resize(44 + data_len as usize, 0);
        Arc::from(wav)
    }

    /// Backend on a sink with no device behind it, with `LOCATOR` already downloaded
    fn backend() -> (AudioBackend, rodio::queue::SourcesQueueOutput) {
        let (sink, queue) = Sink::new();
        let backend = AudioBackend::new(sink, reqwest::Client::new());
        backend.state.lock().last_download = Some((LOCATOR.to_string(), wav_bytes()));
        (backend, queue)
    }

    #[tokio::test]
    async fn pause_and_resume_during_start_appends_once() {
        let (backend, _queue) = backend();
        backend.load(LOCATOR);

        let first = backend.play();
        backend.pause();
        let second = backend.play();

        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(backend.sink.len(), 1);
        assert!(!backend.sink.is_paused());
    }

    #[tokio::test]
    async fn pause_during_start_keeps_sink_paused() {
        let (backend, _queue) = backend();
        backend.load(LOCATOR);

        let start = backend.play();
        backend.pause();
        start.await.unwrap();

        assert_eq!(backend.sink.len(), 1);
        assert!(backend.sink.is_paused());
    }

    #[tokio::test]
    async fn start_for_replaced_source_leaves_sink_alone() {
        let (backend, _queue) = backend();
        backend.load(LOCATOR);

        let stale = backend.play();
        backend.load("http://127.0.0.1:8000/media/songs/2.wav");

        assert!(stale.await.is_err());
        assert!(backend.sink.empty());
        assert!(!backend.state.lock().appended);
    }

    #[tokio::test]
    async fn resume_after_drain_appends_again() {
        let (backend, _queue) = backend();
        backend.load(LOCATOR);
        {
            // Played to the end: appended once, sink now empty
            let mut state = backend.state.lock();
            state.appended = true;
            state.end_reported = true;
        }

        backend.play().await.unwrap();

        assert_eq!(backend.sink.len(), 1);
        assert!(!backend.sink.is_paused());
        assert!(!backend.state.lock().end_reported);
    }

    #[tokio::test]
    async fn play_without_load_fails() {
        let (backend, _queue) = backend();
        assert!(backend.play().await.is_err());
        assert!(backend.sink.empty());
    }
}
