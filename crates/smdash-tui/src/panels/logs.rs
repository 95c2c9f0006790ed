//! Logs panel: the reconciled daemon log feed.
//!
//! Scroll state lives in the session's [`LogFeed`] so reconciliation can
//! keep the view pinned to the newest line while the user is at the bottom.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use smdash_core::reconcile::LogFeed;

use super::PanelState;

/// Draw `feed`, recording the viewport height it was given.
///
/// `flash` paints the border while a fresh failure is being highlighted.
pub fn render(feed: &mut LogFeed, flash: bool, frame: &mut Frame, area: Rect) {
    feed.set_viewport_height(area.height.saturating_sub(2) as usize);

    let border = if flash {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    if feed.is_empty() {
        let empty = Paragraph::new("  (no log lines yet)")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .title(" Logs (0) ")
                    .borders(Borders::ALL)
                    .border_style(border),
            );
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = feed
        .visible()
        .iter()
        .map(|line| {
            if line.failure {
                ListItem::new(Line::from(vec![
                    Span::styled("! ", Style::default().fg(Color::Red)),
                    Span::styled(line.text.as_str(), Style::default().fg(Color::LightRed)),
                ]))
            } else {
                ListItem::new(Line::from(vec![Span::raw("  "), Span::raw(line.text.as_str())]))
            }
        })
        .collect();

    let follow = if feed.at_bottom() { " [follow]" } else { "" };
    let title = format!(" Logs ({}){follow} ", feed.len());
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(list, area);
}

impl PanelState for LogFeed {
    fn scroll_down(&mut self, n: usize) {
        LogFeed::scroll_down(self, n);
    }

    fn scroll_up(&mut self, n: usize) {
        LogFeed::scroll_up(self, n);
    }

    fn scroll_to_top(&mut self) {
        LogFeed::scroll_to_top(self);
    }

    fn scroll_to_bottom(&mut self) {
        LogFeed::scroll_to_bottom(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::testing::screen;
    use ratatui::backend::TestBackend;
    use serde_json::json;
    use smdash_core::DashboardSession;
    use smdash_test_utils::{ScriptedApi, TestConfigBuilder};

    async fn session_with_logs(count: usize) -> DashboardSession {
        let logs: Vec<String> = (0..count).map(|i| format!("line {i}")).collect();
        let api = ScriptedApi::new().with_snapshot(json!({ "logs": logs }));
        let mut session = DashboardSession::new(&TestConfigBuilder::new().build());
        session.refresh(&api).await;
        session
    }

    fn draw(feed: &mut LogFeed, flash: bool, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, height)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(feed, flash, frame, area)
            })
            .unwrap();
        screen(&terminal)
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let mut session = session_with_logs(0).await;
        let text = draw(session.feed_mut(), false, 6);
        assert!(text.contains("Logs (0)"));
        assert!(text.contains("no log lines yet"));
    }

    #[tokio::test]
    async fn test_render_sets_viewport_and_follows() {
        let mut session = session_with_logs(30).await;
        let feed = session.feed_mut();

        let text = draw(feed, false, 12);
        assert_eq!(feed.viewport_height(), 10);
        assert_eq!(feed.scroll_top(), 20);
        assert!(text.contains("line 29"));
        assert!(!text.contains("line 19"));
        assert!(text.contains("[follow]"));
    }

    #[tokio::test]
    async fn test_scrolling_through_panel_state() {
        let mut session = session_with_logs(30).await;
        let feed = session.feed_mut();
        draw(feed, false, 12);

        let state: &mut dyn PanelState = &mut *feed;
        state.scroll_to_top();
        state.scroll_down(3);
        assert_eq!(feed.scroll_top(), 3);

        let text = draw(feed, false, 12);
        assert!(text.contains("line 3"));
        assert!(!text.contains("[follow]"));

        PanelState::scroll_to_bottom(&mut *feed);
        assert!(feed.at_bottom());
    }

    #[tokio::test]
    async fn test_failure_lines_are_marked() {
        let api = ScriptedApi::new().with_snapshot(json!({ "logs": ["ok", "login failed"] }));
        let mut session = DashboardSession::new(&TestConfigBuilder::new().build());
        session.refresh(&api).await;

        let text = draw(session.feed_mut(), true, 6);
        assert!(text.contains("! login failed"));
        assert!(text.contains("  ok"));
    }
}
