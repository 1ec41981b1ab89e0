//! Utility functions for rendering UI components

use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::Style,
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: usize,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Calculate width needed for index column (log10(n) + padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    if item_count == 0 {
        2
    } else {
        let digits = (item_count as f64).log10().floor() as usize + 1;
        digits + 1
    }
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

/// Column widths for song rows: (num, title, artist, tag)
pub fn calculate_song_column_widths(content_width: usize, item_count: usize) -> (usize, usize, usize, usize) {
    // Format: " {num}   {title}   {artist}   {tag}"
    let num_width = calculate_num_width(item_count);
    let tag_width = 12;
    let fixed_width = 1 + num_width + 3 + 3 + 3 + tag_width;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 55) / 100;
    let artist_width = remaining_width.saturating_sub(title_width);

    (num_width, title_width, artist_width, tag_width)
}

/// A `width` x `height` rectangle centered in `area`, clamped to it
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}

/// Horizontal bar of `width` cells scaled to `value / max`
pub fn stat_bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 || width == 0 {
        return String::new();
    }
    let filled = ((value as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled.clamp(1, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0:00");
        assert_eq!(format_duration(Duration::from_millis(185_900)), "3:05");
    }

    #[test]
    fn truncates_with_ellipsis_and_pads() {
        assert_eq!(truncate_string("Harmoura", 5), "Ha...");
        assert_eq!(truncate_string("Hi", 4), "Hi  ");
    }

    #[test]
    fn bars_scale_to_the_maximum() {
        assert_eq!(stat_bar(10, 10, 4).chars().count(), 4);
        assert_eq!(stat_bar(5, 10, 4).chars().count(), 2);
        assert_eq!(stat_bar(1, 100, 4).chars().count(), 1);
        assert_eq!(stat_bar(3, 0, 4), "");
    }

    #[test]
    fn centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(area, 60, 10);
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (20, 15, 60, 10));

        let small = centered_rect(Rect::new(0, 0, 20, 5), 60, 10);
        assert_eq!((small.width, small.height), (20, 5));
    }
}
