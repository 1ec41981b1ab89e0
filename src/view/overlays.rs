//! Overlay rendering (error notification, pickers, prompts, help popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::model::{ConfirmAction, Overlay, ToastLevel, UiState};
use super::utils::{centered_rect, truncate_string};

fn popup_block(title: String, color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Black))
}

/// Display width of `text` plus `padding`, saturating at `u16::MAX`
fn padded_width(text_len: usize, padding: u16) -> u16 {
    u16::try_from(text_len).unwrap_or(u16::MAX).saturating_add(padding)
}

pub fn render_error_notification(frame: &mut Frame, ui_state: &UiState) {
    let Some(toast) = ui_state.toast.as_ref().filter(|t| t.level == ToastLevel::Error) else {
        return;
    };
    let area = frame.area();

    // Fixed width popup (responsive to screen size)
    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;

    // Lines the message takes once wrapped
    let error_line_count = toast.message.chars().count().div_ceil(inner_width).max(1);

    // Height: top border (1) + error lines + bottom border (1)
    let popup_height = padded_width(error_line_count, 2).min(area.height.saturating_sub(4));
    let popup_area = centered_rect(area, popup_width, popup_height);

    // Clear the area behind the popup first
    frame.render_widget(Clear, popup_area);

    let error_widget = Paragraph::new(toast.message.clone())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: false })
        .block(popup_block(" Error (Esc to dismiss) ".to_string(), Color::Red));

    frame.render_widget(error_widget, popup_area);
}

pub fn render_overlay(frame: &mut Frame, overlay: &Overlay, ui_state: &UiState) {
    match overlay {
        Overlay::Help => render_help_popup(frame),
        Overlay::PlaylistPicker { song, selected } => {
            let names: Vec<String> = ui_state
                .playlists
                .iter()
                .map(|p| format!("♫ {} ({})", p.name, p.songs.len()))
                .collect();
            let title = format!(" Add \"{}\" to (↑↓ Enter Esc) ", truncate_string(&song.title, 24));
            render_picker(frame, title, &names, *selected);
        }
        Overlay::FilterPicker { options, selected } => {
            let labels: Vec<String> = options.iter().map(|o| o.label()).collect();
            render_picker(frame, " Filter songs (↑↓ Enter Esc) ".to_string(), &labels, *selected);
        }
        Overlay::NewPlaylist { name, song_ids } => render_name_prompt(frame, name, song_ids.len()),
        Overlay::Confirm(action) => render_confirm(frame, action),
    }
}

fn render_picker(frame: &mut Frame, title: String, entries: &[String], selected: usize) {
    let area = frame.area();

    let max_name_len = entries.iter().map(|e| e.chars().count()).max().unwrap_or(30);
    let popup_width = padded_width(max_name_len, 6)
        .max(padded_width(title.chars().count(), 2))
        .clamp(35, 60);
    let popup_height = padded_width(entries.len(), 2).clamp(5, area.height.saturating_sub(4).max(5));
    let popup_area = centered_rect(area, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if i == selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(entry.clone()).style(style)
        })
        .collect();

    let list = List::new(items).block(popup_block(title, Color::Cyan));

    let mut list_state = ListState::default();
    list_state.select(Some(selected));

    frame.render_stateful_widget(list, popup_area, &mut list_state);
}

fn render_name_prompt(frame: &mut Frame, name: &str, song_count: usize) {
    let popup_area = centered_rect(frame.area(), 50, 5);
    frame.render_widget(Clear, popup_area);

    let detail = match song_count {
        0 => "Starts empty".to_string(),
        1 => "Starts with the selected song".to_string(),
        n => format!("Starts with {} songs", n),
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Name: ", Style::default().fg(Color::Cyan)),
            Span::styled(format!("{}_", name), Style::default().fg(Color::White)),
        ]),
        Line::from(""),
        Line::from(Span::styled(detail, Style::default().fg(Color::DarkGray))),
    ];

    let prompt = Paragraph::new(lines).block(popup_block(" New playlist (Enter Esc) ".to_string(), Color::Cyan));
    frame.render_widget(prompt, popup_area);
}

fn render_confirm(frame: &mut Frame, action: &ConfirmAction) {
    let prompt = action.prompt();
    let width = padded_width(prompt.chars().count(), 6).clamp(30, 60);
    let popup_area = centered_rect(frame.area(), width, 5);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(Span::styled(prompt, Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" confirm   "),
            Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]),
    ];

    let confirm = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(popup_block(" Confirm ".to_string(), Color::Yellow));
    frame.render_widget(confirm, popup_area);
}

fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = [
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("↑ / ↓", "Move selection"),
        ("← / →", "Switch search category"),
        ("Enter", "Open / Play"),
        ("Backspace / Esc", "Go back"),
        ("G", "Focus search"),
        ("L", "Focus playlists"),
        ("", ""),
        ("", "── Playback ──"),
        ("Space", "Play / Pause"),
        ("N", "Next track"),
        ("P", "Previous track"),
        ("U", "Show queue"),
        ("", ""),
        ("", "── Songs & Playlists ──"),
        ("F", "Filter song list"),
        ("A", "Add song to playlist"),
        ("X", "Remove song from playlist"),
        ("C", "New playlist"),
        ("D", "Delete playlist"),
        ("R", "Reload playlists"),
        ("", ""),
        ("", "── General ──"),
        ("O", "Sign out"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_height = (keybindings.len() as u16 + 2).min(area.height.saturating_sub(4));
    let popup_area = centered_rect(area, 62, popup_height);

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(popup_block(" Help (H or Esc to close) ".to_string(), Color::Cyan))
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::model::Toast;
    use std::time::Instant;

    #[test]
    fn error_popup_shows_message() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let ui_state = UiState {
            toast: Some(Toast {
                message: "Cannot reach the server".to_string(),
                level: ToastLevel::Error,
                created: Instant::now(),
            }),
            ..Default::default()
        };

        terminal
            .draw(|f| render_error_notification(f, &ui_state))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Cannot reach the server"));
    }

    #[test]
    fn widths_saturate_instead_of_wrapping() {
        assert_eq!(padded_width(10, 6), 16);
        assert_eq!(padded_width(65_533, 6), u16::MAX);
        assert_eq!(padded_width(usize::MAX, 2), u16::MAX);
    }

    #[test]
    fn picker_with_huge_playlist_name_renders() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let names = vec!["x".repeat(70_000), "Road trip".to_string()];

        terminal
            .draw(|f| render_picker(f, " Add to ".to_string(), &names, 1))
            .unwrap();

        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Road trip"));
    }
}
