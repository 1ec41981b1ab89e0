//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, ConfirmAction, Overlay};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error().await;
            }
            return Ok(());
        }

        if let Some(overlay) = model.get_overlay().await {
            drop(model);
            return self.handle_overlay_key(overlay, key).await;
        }

        let ui_state = model.get_ui_state().await;

        // Handle search input when in search section
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    model.cycle_section_forward().await;
                    return Ok(());
                }
                KeyCode::BackTab => {
                    model.cycle_section_backward().await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = model.take_search_now().await;
                    drop(model);
                    if let Some(query) = query {
                        self.spawn_search(query);
                    }
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.clear_search().await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    // Q still quits even in search mode when Ctrl is pressed
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                        return Ok(());
                    }
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Handle MainContent section navigation
        if ui_state.active_section == ActiveSection::MainContent {
            match key.code {
                KeyCode::Up => {
                    model.content_move(false).await;
                    return Ok(());
                }
                KeyCode::Down => {
                    model.content_move(true).await;
                    return Ok(());
                }
                KeyCode::Left => {
                    model.navigate_search_section(false).await;
                    return Ok(());
                }
                KeyCode::Right => {
                    model.navigate_search_section(true).await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    if let Some(item) = selected {
                        self.handle_selected_item(item).await;
                    }
                    return Ok(());
                }
                KeyCode::Backspace | KeyCode::Esc => {
                    model.navigate_back().await;
                    return Ok(());
                }
                KeyCode::Char('f') | KeyCode::Char('F') => {
                    if !model.open_filter_picker().await {
                        model.set_info("Filters apply to song lists".to_string()).await;
                    }
                    return Ok(());
                }
                KeyCode::Char('a') | KeyCode::Char('A') => {
                    let track = model.get_selected_track().await;
                    drop(model);
                    if let Some(track) = track {
                        self.open_playlist_picker(track).await;
                    }
                    return Ok(());
                }
                KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => {
                    let selected = model.get_selected_playlist_song().await;
                    drop(model);
                    if let Some((playlist_id, song_id)) = selected {
                        self.remove_song_from_playlist(playlist_id, song_id).await;
                    }
                    return Ok(());
                }
                KeyCode::Char('c') | KeyCode::Char('C') => {
                    let track = model.get_selected_track().await;
                    drop(model);
                    let song_ids = track.map(|t| vec![t.id]).unwrap_or_default();
                    self.open_new_playlist_prompt(song_ids).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                model.cycle_section_forward().await;
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                model.move_selection_down().await;
            }
            KeyCode::Enter => match ui_state.active_section {
                ActiveSection::Library => {
                    if let Some(entry) = model.get_selected_library_entry().await {
                        drop(model);
                        self.open_library_entry(entry).await;
                    }
                }
                ActiveSection::Playlists => {
                    if let Some(playlist) = model.get_selected_playlist().await {
                        drop(model);
                        self.open_playlist(playlist).await;
                    }
                }
                _ => {}
            },
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_track().await;
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_track().await;
            }
            // Focus search
            KeyCode::Char('g') | KeyCode::Char('G') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            // Focus playlists
            KeyCode::Char('l') | KeyCode::Char('L') => {
                model.set_active_section(ActiveSection::Playlists).await;
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                drop(model);
                self.show_queue().await;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                drop(model);
                self.open_new_playlist_prompt(Vec::new()).await;
            }
            KeyCode::Char('D') | KeyCode::Delete if ui_state.active_section == ActiveSection::Playlists => {
                drop(model);
                self.confirm_delete_playlist().await;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                drop(model);
                self.load_user_playlists().await;
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                model.open_overlay(Overlay::Confirm(ConfirmAction::SignOut)).await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.open_overlay(Overlay::Help).await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_overlay_key(&self, overlay: Overlay, key: KeyEvent) -> Result<()> {
        let model = self.model.lock().await;

        match overlay {
            Overlay::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                    model.close_overlay().await;
                }
            }
            Overlay::PlaylistPicker { song, selected } => match key.code {
                KeyCode::Up => model.overlay_move(false).await,
                KeyCode::Down => model.overlay_move(true).await,
                KeyCode::Enter => {
                    let playlist = model.get_playlists().await.into_iter().nth(selected);
                    model.close_overlay().await;
                    drop(model);
                    if let Some(playlist) = playlist {
                        self.add_song_to_playlist(&playlist, &song).await;
                    }
                }
                KeyCode::Esc => model.close_overlay().await,
                _ => {}
            },
            Overlay::FilterPicker { options, selected } => match key.code {
                KeyCode::Up => model.overlay_move(false).await,
                KeyCode::Down => model.overlay_move(true).await,
                KeyCode::Enter => {
                    if let Some(option) = options.get(selected) {
                        model.apply_filter(option).await;
                    }
                    model.close_overlay().await;
                }
                KeyCode::Esc => model.close_overlay().await,
                _ => {}
            },
            Overlay::NewPlaylist { name, song_ids } => match key.code {
                KeyCode::Enter => {
                    if name.trim().is_empty() {
                        return Ok(());
                    }
                    model.close_overlay().await;
                    drop(model);
                    self.create_playlist(name, song_ids).await;
                }
                KeyCode::Esc => model.close_overlay().await,
                KeyCode::Backspace => model.overlay_input(None).await,
                KeyCode::Char(c) => model.overlay_input(Some(c)).await,
                _ => {}
            },
            Overlay::Confirm(action) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    model.close_overlay().await;
                    drop(model);
                    match action {
                        ConfirmAction::DeletePlaylist { id, name } => self.delete_playlist(id, &name).await,
                        ConfirmAction::SignOut => self.sign_out().await,
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => model.close_overlay().await,
                _ => {}
            },
        }
        Ok(())
    }
}
