//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (enums, UI state, overlays, toasts)
//! - `playback`: Playback information sampled from the player
//! - `content`: Content view data (song lists, filters, categories, search)
//! - `api_client`: Harmoura backend client and its records
//! - `app_model`: Main application model with state management methods

mod types;
mod playback;
mod content;
mod api_client;
mod app_model;

pub use types::{
    ActiveSection, CategoryKind, ConfirmAction, LibraryEntry, Overlay, SearchResultSection,
    SelectedItem, Toast, ToastLevel, UiState,
};

pub use playback::PlaybackInfo;

pub use content::{ContentState, ContentView, SongList, SongListSource};

pub use api_client::{AuthResponse, AuthTokens, HarmouraClient, Playlist, Profile, SearchResults};

pub use app_model::AppModel;
