//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, sidebar)
//! - `content`: Main content area rendering
//! - `progress`: Player bar rendering
//! - `overlays`: Modal overlays (error, pickers, prompts, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, PlaybackInfo, ToastLevel, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackInfo, ui_state: &UiState, content_state: &ContentState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + account
                Constraint::Min(0),    // Main content (sidebar + content)
                Constraint::Length(3), // Player bar
                Constraint::Length(1), // Status line
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Sidebar (Library + Playlists)
                Constraint::Percentage(70), // Main content
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ui_state);

        let current_id = playback.current.as_ref().map(|t| t.id);
        content::render_main_content(frame, main_chunks[1], ui_state, content_state, playback, current_id);

        progress::render_progress_bar(frame, chunks[2], playback);

        layout::render_status_line(frame, chunks[3], ui_state);

        if let Some(overlay) = &ui_state.overlay {
            overlays::render_overlay(frame, overlay, ui_state);
        }

        if ui_state.toast.as_ref().is_some_and(|t| t.level == ToastLevel::Error) {
            overlays::render_error_notification(frame, ui_state);
        }
    }
}
