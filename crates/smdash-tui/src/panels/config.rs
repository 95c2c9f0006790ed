//! Config panel: the resolved client configuration as TOML.

use std::path::Path;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use smdash_config::AppConfig;

use super::PanelState;

pub struct ConfigPanel {
    lines: Vec<String>,
    scroll_offset: usize,
}

impl ConfigPanel {
    /// `source` is the file the config came from; `None` means defaults.
    pub fn new(config: &AppConfig, source: Option<&Path>) -> Self {
        let origin = match source {
            Some(path) => format!("# loaded from {}", path.display()),
            None => "# built-in defaults".to_string(),
        };
        let body =
            toml::to_string_pretty(config).unwrap_or_else(|e| format!("# (cannot render: {e})"));

        let mut lines = vec![origin, String::new()];
        lines.extend(body.lines().map(String::from));
        Self {
            lines,
            scroll_offset: 0,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let height = area.height.saturating_sub(2) as usize;
        let visible: Vec<Line> = self
            .lines
            .iter()
            .skip(self.scroll_offset)
            .take(height)
            .map(|line| highlight(line))
            .collect();

        let paragraph = Paragraph::new(visible)
            .block(Block::default().title(" Config ").borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }
}

fn highlight(line: &str) -> Line<'_> {
    if line.starts_with('#') {
        Line::from(Span::styled(line, Style::default().fg(Color::DarkGray)))
    } else if line.starts_with('[') {
        Line::from(Span::styled(
            line,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
    } else if let Some((key, value)) = line.split_once(" = ") {
        Line::from(vec![
            Span::styled(key, Style::default().fg(Color::Yellow)),
            Span::raw(" = "),
            Span::styled(value, Style::default().fg(Color::Green)),
        ])
    } else {
        Line::from(line)
    }
}

impl PanelState for ConfigPanel {
    fn scroll_down(&mut self, n: usize) {
        let max = self.lines.len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + n).min(max);
    }

    fn scroll_up(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.lines.len().saturating_sub(1);
    }
}
