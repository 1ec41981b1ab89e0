//! Layout rendering (top bar, sidebar, status line)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, ToastLevel, UiState};

fn section_border(ui_state: &UiState, section: ActiveSection) -> Style {
    if ui_state.active_section == section {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

fn item_style(selected: bool, focused: bool) -> Style {
    match (selected, focused) {
        (true, true) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::White),
    }
}

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(25), // Signed-in user
        ])
        .split(area);

    let searching = ui_state.active_section == ActiveSection::Search;
    let search_text = if ui_state.search_query.is_empty() {
        "Songs, artists, emotions, languages..."
    } else {
        &ui_state.search_query
    };
    let search_title = if ui_state.search_edited_at.is_some() {
        " Search … "
    } else {
        " Search "
    };

    let search = Paragraph::new(search_text)
        .style(if searching {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::White)
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(search_title)
                .padding(Padding::horizontal(1))
                .border_style(section_border(ui_state, ActiveSection::Search)),
        );
    frame.render_widget(search, chunks[0]);

    let account = Paragraph::new(format!("♪ {}", ui_state.username))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Account "));
    frame.render_widget(account, chunks[1]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(ui_state.library_items.len() as u16 + 2),
            Constraint::Min(0), // Playlists (fills remaining space)
        ])
        .split(area);

    let library_focused = ui_state.active_section == ActiveSection::Library;
    let library_items: Vec<ListItem> = ui_state
        .library_items
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            ListItem::new(entry.label()).style(item_style(i == ui_state.library_selected, library_focused))
        })
        .collect();

    let library = List::new(library_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Library ")
            .padding(Padding::horizontal(1))
            .border_style(section_border(ui_state, ActiveSection::Library)),
    );
    frame.render_widget(library, chunks[0]);

    let playlists_focused = ui_state.active_section == ActiveSection::Playlists;
    let playlist_items: Vec<ListItem> = ui_state
        .playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            let text = format!("{} ({})", playlist.name, playlist.songs.len());
            ListItem::new(text).style(item_style(i == ui_state.playlist_selected, playlists_focused))
        })
        .collect();

    let playlists = List::new(playlist_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Playlists ")
                .padding(Padding::horizontal(1))
                .border_style(section_border(ui_state, ActiveSection::Playlists)),
        )
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.playlist_selected));

    frame.render_stateful_widget(playlists, chunks[1], &mut list_state);
}

/// Info toasts, or key hints when there is nothing to say
pub fn render_status_line(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let line = match &ui_state.toast {
        Some(toast) if toast.level == ToastLevel::Info => Line::from(Span::styled(
            format!(" {}", toast.message),
            Style::default().fg(Color::Yellow),
        )),
        _ => Line::from(Span::styled(
            " Space play/pause · n/p next/prev · g search · f filter · a add to playlist · h help · q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
