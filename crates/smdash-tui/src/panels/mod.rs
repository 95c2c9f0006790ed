//! TUI panel implementations.

mod alerts;
mod blocked;
mod config;
pub mod logs;
mod overview;

pub use alerts::AlertsPanel;
pub use blocked::BlockedPanel;
pub use config::ConfigPanel;
pub use overview::OverviewPanel;

use ratatui::style::{Color, Style};
use smdash_core::view::{Badge, Tone};

/// Trait for panels that support scrolling.
pub trait PanelState {
    /// Scroll down by `n` rows.
    fn scroll_down(&mut self, n: usize);

    /// Scroll up by `n` rows.
    fn scroll_up(&mut self, n: usize);

    /// Scroll to the very top.
    fn scroll_to_top(&mut self);

    /// Scroll to the very bottom.
    fn scroll_to_bottom(&mut self);
}

pub fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Ok => Style::default().fg(Color::Green),
        Tone::Warn => Style::default().fg(Color::Yellow),
        Tone::Neutral => Style::default().fg(Color::DarkGray),
    }
}

pub fn badge_span(badge: &Badge) -> ratatui::text::Span<'_> {
    ratatui::text::Span::styled(badge.text.as_str(), tone_style(badge.tone))
}
