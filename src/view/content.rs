//! Main content area rendering (song lists, categories, search results, profile, queue)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{
    ActiveSection, CategoryKind, ContentState, ContentView, PlaybackInfo, Profile, SearchResultSection,
    SearchResults, SongList, UiState,
};
use crate::player::{Track, TrackId};
use super::utils::{
    calculate_num_width, calculate_song_column_widths, render_scrollable_list, stat_bar, truncate_string,
};

fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

fn row_style(selected: bool, is_focused: bool, is_playing: bool) -> Style {
    if selected && is_focused {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if is_playing {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn header_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, is_focused: bool) {
    let message = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .padding(Padding::horizontal(1))
                .border_style(border_style(is_focused)),
        );
    frame.render_widget(message, area);
}

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    playback: &PlaybackInfo,
    current_id: Option<TrackId>,
) {
    let is_focused = ui_state.active_section == ActiveSection::MainContent;

    if content_state.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Content ")
                    .border_style(border_style(is_focused)),
            );
        frame.render_widget(loading, area);
        return;
    }

    match &content_state.view {
        ContentView::Empty => render_message(
            frame,
            area,
            "Pick something from the Library, or press g and type to search\n\nTab cycles sections\n↑/↓ select, Enter opens or plays\nh shows every key",
            is_focused,
        ),
        ContentView::Songs(list) => render_song_list(frame, area, list, is_focused, current_id),
        ContentView::Categories {
            kind,
            values,
            selected_index,
        } => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ({}) ", kind.plural(), values.len()))
                .padding(Padding::horizontal(1))
                .border_style(border_style(is_focused));
            if values.is_empty() {
                render_message(frame, area, "Nothing tagged yet", is_focused);
            } else {
                let items = value_items(values, *selected_index, is_focused);
                render_scrollable_list(frame, area, items, *selected_index, block);
            }
        }
        ContentView::SearchResults {
            query,
            results,
            section,
            song_index,
            artist_index,
            emotion_index,
            language_index,
        } => {
            let index = match section {
                SearchResultSection::Songs => *song_index,
                SearchResultSection::Artists => *artist_index,
                SearchResultSection::Emotions => *emotion_index,
                SearchResultSection::Languages => *language_index,
            };
            render_search_results(frame, area, query, results, *section, index, is_focused, current_id);
        }
        ContentView::Profile(profile) => render_profile(frame, area, profile, ui_state, is_focused),
        ContentView::Queue { selected_index } => {
            render_queue(frame, area, playback, *selected_index, is_focused, current_id)
        }
    }
}

/// Header row plus one row per track
fn song_items(
    tracks: &[Track],
    selected_index: usize,
    is_focused: bool,
    current_id: Option<TrackId>,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let (num_width, title_width, artist_width, tag_width) =
        calculate_song_column_widths(content_width, tracks.len());

    let mut items = vec![ListItem::new(format!(
        " {:<num_width$}   {:<title_width$}   {:<artist_width$}   {:<tag_width$}",
        "#", "Title", "Artist", "Emotion",
    ))
    .style(header_style())];

    items.extend(tracks.iter().enumerate().map(|(i, track)| {
        let is_playing = current_id == Some(track.id);
        let playing_indicator = if is_playing { "▶" } else { " " };
        let track_num = format!("{}{:<num_width$}", playing_indicator, i + 1);
        let emotion = track.emotion.as_deref().unwrap_or("-");

        ListItem::new(format!(
            "{}   {}   {}   {}",
            track_num,
            truncate_string(&track.title, title_width),
            truncate_string(&track.artist, artist_width),
            truncate_string(emotion, tag_width),
        ))
        .style(row_style(i == selected_index, is_focused, is_playing))
    }));
    items
}

fn value_items(values: &[String], selected_index: usize, is_focused: bool) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(values.len());
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            ListItem::new(format!(" {:<num_width$}   {}", i + 1, value))
                .style(row_style(i == selected_index, is_focused, false))
        })
        .collect()
}

fn render_song_list(
    frame: &mut Frame,
    area: Rect,
    list: &SongList,
    is_focused: bool,
    current_id: Option<TrackId>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Songs
        ])
        .split(area);

    let visible = list.visible();
    let count = if list.filter.is_empty() {
        format!("{} songs", list.tracks.len())
    } else {
        format!("{} of {} songs | {}", visible.len(), list.tracks.len(), list.filter.describe())
    };
    let hints = if list.playlist_id().is_some() {
        "Enter: Play | f: Filter | x: Remove | Backspace: Back"
    } else {
        "Enter: Play | f: Filter | a: Add to playlist | Backspace: Back"
    };
    let header = Paragraph::new(format!("♫ {}\n {} | {}", list.title, count, hints))
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .padding(Padding::horizontal(1))
                .borders(Borders::ALL)
                .border_style(border_style(is_focused)),
        );
    frame.render_widget(header, chunks[0]);

    if visible.is_empty() {
        let text = if list.tracks.is_empty() {
            "No songs here yet"
        } else {
            "No songs match the filter (f, then Clear filters)"
        };
        render_message(frame, chunks[1], text, is_focused);
        return;
    }

    let content_width = chunks[1].width.saturating_sub(4) as usize;
    let items = song_items(&visible, list.selected, is_focused, current_id, content_width);
    let block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));
    // +1 for header row
    render_scrollable_list(frame, chunks[1], items, list.selected + 1, block);
}

#[allow(clippy::too_many_arguments)]
fn render_search_results(
    frame: &mut Frame,
    area: Rect,
    query: &str,
    results: &SearchResults,
    section: SearchResultSection,
    selected_index: usize,
    is_focused: bool,
    current_id: Option<TrackId>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Category tabs
            Constraint::Min(0),    // Results list
        ])
        .split(area);

    let tabs = [
        (SearchResultSection::Songs, "Songs", results.songs.len()),
        (SearchResultSection::Artists, "Artists", results.artists.len()),
        (SearchResultSection::Emotions, "Emotions", results.emotions.len()),
        (SearchResultSection::Languages, "Languages", results.languages.len()),
    ];
    let tabs_content: Vec<Span> = tabs
        .iter()
        .flat_map(|(tab_section, name, count)| {
            let style = if *tab_section == section {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled(format!(" {} ({}) ", name, count), style), Span::raw("  ")]
        })
        .collect();

    let tabs = Paragraph::new(Line::from(tabs_content)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Results for \"{}\" (←/→ to switch) ", query))
            .border_style(border_style(is_focused)),
    );
    frame.render_widget(tabs, chunks[0]);

    let content_width = chunks[1].width.saturating_sub(4) as usize;
    let (items, list_index, empty_msg) = match section.category() {
        None => (
            song_items(&results.songs, selected_index, is_focused, current_id, content_width),
            selected_index + 1,
            "No songs found",
        ),
        Some(kind) => {
            let values = match kind {
                CategoryKind::Artist => &results.artists,
                CategoryKind::Emotion => &results.emotions,
                CategoryKind::Language => &results.languages,
            };
            let empty_msg = match kind {
                CategoryKind::Artist => "No artists found",
                CategoryKind::Emotion => "No emotions found",
                CategoryKind::Language => "No languages found",
            };
            (value_items(values, selected_index, is_focused), selected_index, empty_msg)
        }
    };

    // Songs always carry a header row
    let is_empty = match section.category() {
        None => results.songs.is_empty(),
        Some(_) => items.is_empty(),
    };
    if is_empty {
        render_message(frame, chunks[1], &format!("  {}", empty_msg), is_focused);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));
    render_scrollable_list(frame, chunks[1], items, list_index, block);
}

fn stat_lines(title: &str, stats: &std::collections::HashMap<String, u64>, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(title.to_string(), header_style()))];
    let ranked = Profile::ranked(stats);
    if ranked.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Nothing played yet",
            Style::default().fg(Color::DarkGray),
        )));
        return lines;
    }

    let max = ranked.first().map(|(_, count)| *count).unwrap_or(0);
    let label_width = 16;
    let bar_width = width.saturating_sub(label_width + 10).max(1);
    lines.extend(ranked.into_iter().map(|(name, count)| {
        Line::from(vec![
            Span::raw(format!("  {} ", truncate_string(&name, label_width))),
            Span::styled(stat_bar(count, max, bar_width), Style::default().fg(Color::Green)),
            Span::raw(format!(" {}", count)),
        ])
    }));
    lines
}

fn render_profile(frame: &mut Frame, area: Rect, profile: &Profile, ui_state: &UiState, is_focused: bool) {
    let username = if profile.username.is_empty() {
        ui_state.username.as_str()
    } else {
        profile.username.as_str()
    };
    let width = area.width.saturating_sub(4) as usize;

    let mut lines = vec![
        Line::from(Span::styled(format!("♪ {}", username), header_style())),
        Line::from(format!("  {}", profile.email.as_deref().unwrap_or("-"))),
        Line::from(""),
    ];
    lines.extend(stat_lines("Top emotions", &profile.emotion_stats, width));
    lines.push(Line::from(""));
    lines.extend(stat_lines("Top artists", &profile.artist_stats, width));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Profile ")
            .padding(Padding::horizontal(1))
            .border_style(border_style(is_focused)),
    );
    frame.render_widget(paragraph, area);
}

fn render_queue(
    frame: &mut Frame,
    area: Rect,
    playback: &PlaybackInfo,
    selected_index: usize,
    is_focused: bool,
    current_id: Option<TrackId>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Now playing
            Constraint::Min(0),    // Queue
        ])
        .split(area);

    let now_playing = match &playback.current {
        Some(track) => format!("▶ {}", track.display_name()),
        None => "Nothing playing".to_string(),
    };
    let position = playback
        .queue_label()
        .unwrap_or_else(|| "not in queue".to_string());
    let header = Paragraph::new(format!("{}\n {} | Enter: Play | Backspace: Back", now_playing, position))
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Now Playing ")
                .padding(Padding::horizontal(1))
                .border_style(border_style(is_focused)),
        );
    frame.render_widget(header, chunks[0]);

    if playback.queue.is_empty() {
        render_message(frame, chunks[1], "Queue is empty. Play something from a list.", is_focused);
        return;
    }

    let content_width = chunks[1].width.saturating_sub(4) as usize;
    let items = song_items(&playback.queue, selected_index, is_focused, current_id, content_width);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Queue ({}) ", playback.queue.len()))
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));
    render_scrollable_list(frame, chunks[1], items, selected_index + 1, block);
}
