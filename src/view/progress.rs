//! Player bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::PlaybackInfo;
use super::utils::format_duration;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let status_text = match &playback.current {
        None => " Nothing playing".to_string(),
        Some(track) if playback.is_playing => format!(" ▶ {}", track.display_name()),
        Some(track) => format!(" ⏸  {}", track.display_name()),
    };

    let time_str = match playback.duration {
        Some(duration) => format!(
            "{} / {}",
            format_duration(playback.progress()),
            format_duration(duration)
        ),
        None if playback.current.is_some() => format_duration(playback.progress()),
        None => String::new(),
    };

    let queue_text = playback
        .queue_label()
        .map(|label| format!("Queue {}", label))
        .unwrap_or_else(|| "No queue".to_string());
    let controls_info = format!(" {} | {} ", queue_text, playback.device_name);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(playback.progress_ratio())
        .label(time_str);

    frame.render_widget(gauge, area);
}
