//! TUI application state and event handling.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use smdash_config::AppConfig;
use smdash_core::{DashboardEvent, DashboardSession, Poller, RefreshOutcome};
use tracing::debug;

use crate::keymap::{Action, KeyMapper};
use crate::panels::{
    self, AlertsPanel, BlockedPanel, ConfigPanel, OverviewPanel, PanelState, badge_span,
};

/// The panels available in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Overview,
    Logs,
    Alerts,
    Blocked,
    Config,
}

const ALL_PANELS: [Panel; 5] = [
    Panel::Overview,
    Panel::Logs,
    Panel::Alerts,
    Panel::Blocked,
    Panel::Config,
];

impl Panel {
    pub fn title(self) -> &'static str {
        match self {
            Panel::Overview => "Overview",
            Panel::Logs => "Logs",
            Panel::Alerts => "Alerts",
            Panel::Blocked => "Blocked",
            Panel::Config => "Config",
        }
    }

    pub fn index(self) -> usize {
        ALL_PANELS.iter().position(|&p| p == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        ALL_PANELS[(self.index() + 1) % ALL_PANELS.len()]
    }

    pub fn prev(self) -> Self {
        ALL_PANELS[(self.index() + ALL_PANELS.len() - 1) % ALL_PANELS.len()]
    }
}

/// TUI application state. Owns the dashboard session; network work goes
/// through the [`Poller`] and comes back via [`App::handle_event`].
pub struct App {
    pub should_quit: bool,
    pub active_panel: Panel,
    pub keymap: KeyMapper,
    pub session: DashboardSession,
    poller: Poller,
    pub overview: OverviewPanel,
    pub alerts: AlertsPanel,
    pub blocked: BlockedPanel,
    pub config_panel: ConfigPanel,
    /// Last notable outcome, shown in the status bar.
    status_message: Option<String>,
}

impl App {
    pub fn new(config: &AppConfig, source: Option<&Path>, poller: Poller) -> Self {
        Self {
            should_quit: false,
            active_panel: Panel::Overview,
            keymap: KeyMapper::new(),
            session: DashboardSession::new(config),
            poller,
            overview: OverviewPanel::new(config),
            alerts: AlertsPanel::new(),
            blocked: BlockedPanel::new(),
            config_panel: ConfigPanel::new(config, source),
            status_message: None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        let action = self.keymap.resolve(key.code);
        self.handle_action(action);
    }

    /// Process a resolved action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::NextPanel => self.active_panel = self.active_panel.next(),
            Action::PrevPanel => self.active_panel = self.active_panel.prev(),
            Action::GoToPanel(n) => {
                if let Some(&panel) = ALL_PANELS.get(n) {
                    self.active_panel = panel;
                }
            }
            Action::ScrollDown => self.active_panel_state_mut().scroll_down(1),
            Action::ScrollUp => self.active_panel_state_mut().scroll_up(1),
            Action::HalfPageDown => self.active_panel_state_mut().scroll_down(10),
            Action::HalfPageUp => self.active_panel_state_mut().scroll_up(10),
            Action::ScrollToTop => self.active_panel_state_mut().scroll_to_top(),
            Action::ScrollToBottom => self.active_panel_state_mut().scroll_to_bottom(),
            Action::Refresh => {
                self.poller.refresh(&mut self.session);
                self.status_message = Some("refreshing…".to_string());
            }
            Action::Unblock => self.unblock_selected(),
            Action::None => {}
        }
    }

    fn unblock_selected(&mut self) {
        if self.active_panel != Panel::Blocked {
            return;
        }
        let Some(ip) = self.blocked.selected_ip(self.session.blocked()) else {
            return;
        };
        let ip = ip.to_string();
        debug!(%ip, "unblock requested from TUI");
        self.status_message = Some(format!("{} {ip}…", self.session.labels().unblock));
        self.poller.spawn_unblock(ip);
    }

    /// Apply a poller event to the session.
    pub fn handle_event(&mut self, event: DashboardEvent) {
        // A failed unblock only shows as the list not changing; the poller
        // logs it.
        if matches!(event, DashboardEvent::Unblocked { .. }) {
            self.status_message = Some("refreshing…".to_string());
        }

        let Some(report) = self.poller.dispatch(&mut self.session, event) else {
            return;
        };
        self.blocked.sync(self.session.blocked().len());
        self.alerts.sync(self.session.alerts().rows.len());
        match &report.outcome {
            RefreshOutcome::Failed { failures, error } => {
                self.status_message = Some(format!("fetch failed ({failures}): {error}"));
            }
            RefreshOutcome::Applied(_) => self.status_message = None,
        }
    }

    /// Periodic housekeeping between fetches.
    pub fn tick(&mut self, instant: Instant) {
        self.session.expire_flash(instant);
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    fn active_panel_state_mut(&mut self) -> &mut dyn PanelState {
        match self.active_panel {
            Panel::Overview => &mut self.overview,
            Panel::Logs => self.session.feed_mut(),
            Panel::Alerts => &mut self.alerts,
            Panel::Blocked => &mut self.blocked,
            Panel::Config => &mut self.config_panel,
        }
    }

    /// Status line text.
    pub fn status_line(&self) -> String {
        let keys = format!(
            " q:quit  Tab:next  j/k:scroll  r:refresh  x:unblock  1-5:panels  [{}]",
            self.active_panel.title()
        );
        match self.status_message() {
            Some(msg) => format!(" {msg} |{keys}"),
            None => keys,
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        self.render_at(frame, Utc::now(), Instant::now());
    }

    pub fn render_at(&mut self, frame: &mut Frame, now: DateTime<Utc>, instant: Instant) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(2),
            ])
            .split(frame.area());

        let flash = self.session.flash_active(instant);
        self.render_header(frame, chunks[0], flash);

        match self.active_panel {
            Panel::Overview => self.overview.render(frame, chunks[1], &self.session, now),
            Panel::Logs => panels::logs::render(self.session.feed_mut(), flash, frame, chunks[1]),
            Panel::Alerts => self.alerts.render(frame, chunks[1], &self.session),
            Panel::Blocked => self.blocked.render(frame, chunks[1], &self.session),
            Panel::Config => self.config_panel.render(frame, chunks[1]),
        }

        let status = Paragraph::new(self.status_line())
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(status, chunks[2]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, flash: bool) {
        let header = self.session.header();
        let title = Line::from(vec![
            Span::styled(
                "SecureMonitor  ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            badge_span(&header.badge),
            Span::raw("  "),
            badge_span(&header.pill),
        ]);

        let mut tabs = Vec::new();
        for (i, panel) in ALL_PANELS.iter().enumerate() {
            let mut style = if *panel == self.active_panel {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::Gray)
            };
            if *panel == Panel::Logs && flash {
                style = style.fg(Color::Red).add_modifier(Modifier::BOLD);
            }
            tabs.push(Span::styled(format!(" {}:{} ", i + 1, panel.title()), style));
        }

        let paragraph = Paragraph::new(vec![title, Line::from(tabs)])
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Action;
    use crate::panels::testing::screen;
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use serde_json::json;
    use smdash_core::FetchError;
    use smdash_test_utils::{ScriptedApi, TestConfigBuilder};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn make_app(api: Arc<ScriptedApi>) -> (App, UnboundedReceiver<DashboardEvent>) {
        let config = TestConfigBuilder::new().build();
        let (poller, rx) = Poller::new(api);
        (App::new(&config, None, poller), rx)
    }

    async fn pump(app: &mut App, rx: &mut UnboundedReceiver<DashboardEvent>) {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event timed out")
            .expect("channel closed");
        app.handle_event(event);
    }

    fn blocked_api() -> Arc<ScriptedApi> {
        Arc::new(
            ScriptedApi::new()
                .with_snapshot(json!({"blocked": ["10.0.0.5", "1.2.3.4"]}))
                .with_snapshot(json!({"blocked": ["10.0.0.5"]})),
        )
    }

    // ── Panel enum ────────────────────────────────────────────────

    #[test]
    fn test_panel_titles_and_indices() {
        assert_eq!(Panel::Overview.title(), "Overview");
        assert_eq!(Panel::Blocked.title(), "Blocked");
        assert_eq!(Panel::Overview.index(), 0);
        assert_eq!(Panel::Config.index(), 4);
    }

    #[test]
    fn test_panel_next_prev_wrap() {
        assert_eq!(Panel::Overview.next(), Panel::Logs);
        assert_eq!(Panel::Config.next(), Panel::Overview);
        assert_eq!(Panel::Overview.prev(), Panel::Config);
        assert_eq!(Panel::Blocked.prev(), Panel::Alerts);
    }

    // ── Actions ───────────────────────────────────────────────────

    #[test]
    fn test_quit_and_ctrl_c() {
        let (mut app, _rx) = make_app(Arc::new(ScriptedApi::new()));
        app.handle_action(Action::Quit);
        assert!(app.should_quit);

        let (mut app, _rx) = make_app(Arc::new(ScriptedApi::new()));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_goto_panel_out_of_range_is_noop() {
        let (mut app, _rx) = make_app(Arc::new(ScriptedApi::new()));
        app.handle_action(Action::GoToPanel(3));
        assert_eq!(app.active_panel, Panel::Blocked);
        app.handle_action(Action::GoToPanel(99));
        assert_eq!(app.active_panel, Panel::Blocked);
    }

    #[test]
    fn test_scroll_actions_on_every_panel() {
        let (mut app, _rx) = make_app(Arc::new(ScriptedApi::new()));
        for i in 0..ALL_PANELS.len() {
            app.handle_action(Action::GoToPanel(i));
            app.handle_action(Action::ScrollDown);
            app.handle_action(Action::HalfPageUp);
            app.handle_action(Action::ScrollToBottom);
            app.handle_action(Action::ScrollToTop);
        }
        assert_eq!(app.active_panel, Panel::Config);
    }

    #[tokio::test]
    async fn test_refresh_fetches_and_applies() {
        let api = blocked_api();
        let (mut app, mut rx) = make_app(Arc::clone(&api));

        app.handle_action(Action::Refresh);
        assert_eq!(app.status_message(), Some("refreshing…"));
        pump(&mut app, &mut rx).await;

        assert_eq!(app.session.blocked().items, vec!["1.2.3.4", "10.0.0.5"]);
        assert_eq!(app.status_message(), None);
        assert_eq!(api.remaining(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_unblock_selected_ip_then_refresh() {
        let api = blocked_api();
        let (mut app, mut rx) = make_app(Arc::clone(&api));
        app.handle_action(Action::Refresh);
        pump(&mut app, &mut rx).await;

        // Only acts on the blocked panel.
        app.handle_action(Action::Unblock);
        app.handle_action(Action::GoToPanel(3));
        app.handle_action(Action::ScrollDown);
        app.handle_action(Action::ScrollUp);
        app.handle_action(Action::Unblock);
        assert_eq!(app.status_message(), Some("Desbloquear 1.2.3.4…"));

        pump(&mut app, &mut rx).await;
        assert_eq!(api.unblocked(), vec!["1.2.3.4"]);
        assert_eq!(app.status_message(), Some("refreshing…"));

        pump(&mut app, &mut rx).await;
        assert_eq!(app.session.blocked().items, vec!["10.0.0.5"]);
        assert_eq!(app.blocked.selected(), 0);
        assert_eq!(app.status_message(), None);
    }

    #[test_log::test(tokio::test)]
    async fn test_rejected_unblock_leaves_list_without_error_text() {
        let blocked = json!({"blocked": ["10.0.0.5", "1.2.3.4"]});
        let api = Arc::new(
            ScriptedApi::new()
                .with_snapshot(blocked.clone())
                .with_snapshot(blocked)
                .fail_unblocks(),
        );
        let (mut app, mut rx) = make_app(Arc::clone(&api));
        app.handle_action(Action::Refresh);
        pump(&mut app, &mut rx).await;

        app.handle_action(Action::GoToPanel(3));
        app.handle_action(Action::Unblock);
        pump(&mut app, &mut rx).await;
        assert_eq!(api.unblocked(), vec!["1.2.3.4"]);
        assert_eq!(app.status_message(), Some("refreshing…"));

        pump(&mut app, &mut rx).await;
        assert_eq!(app.session.blocked().items, vec!["1.2.3.4", "10.0.0.5"]);
        assert_eq!(app.status_message(), None);
        assert!(!app.status_line().contains("failed"));
        assert!(!app.status_line().contains("503"));
    }

    #[tokio::test]
    async fn test_failed_fetch_reported_in_status_line() {
        let api = Arc::new(ScriptedApi::new().with_error(FetchError::Status(503)));
        let (mut app, mut rx) = make_app(api);
        app.handle_action(Action::Refresh);
        pump(&mut app, &mut rx).await;

        assert!(
            app.status_line()
                .starts_with(" fetch failed (1): daemon returned HTTP 503 |")
        );
        assert_eq!(app.session.header().badge.text, "Retraso de red…");
    }

    #[tokio::test]
    async fn test_recovered_fetch_clears_failure_status() {
        let api = Arc::new(
            ScriptedApi::new()
                .with_error(FetchError::Status(503))
                .with_snapshot(json!({"blocked": ["1.2.3.4"]})),
        );
        let (mut app, mut rx) = make_app(api);
        app.handle_action(Action::Refresh);
        pump(&mut app, &mut rx).await;
        assert!(app.status_message().is_some_and(|m| m.starts_with("fetch failed")));

        // A tick-driven fetch, not a manual refresh.
        app.handle_event(DashboardEvent::Tick);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.status_message(), None);
        assert_eq!(app.session.blocked().items, vec!["1.2.3.4"]);
    }

    #[tokio::test]
    async fn test_tick_expires_flash() {
        let api = Arc::new(ScriptedApi::new().with_snapshot(json!({"logs": ["ERROR disk full"]})));
        let (mut app, mut rx) = make_app(api);
        app.handle_action(Action::Refresh);
        pump(&mut app, &mut rx).await;

        let now = Instant::now();
        assert!(app.session.flash_active(now));
        app.tick(now + Duration::from_secs(10));
        assert!(!app.session.flash_active(now));
    }

    // ── Rendering ─────────────────────────────────────────────────

    #[test]
    fn test_render_initial_screen() {
        let (mut app, _rx) = make_app(Arc::new(ScriptedApi::new()));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("SecureMonitor"));
        assert!(text.contains("Conectando…"));
        assert!(text.contains("1:Overview"));
        assert!(text.contains("[Overview]"));
    }

    #[test]
    fn test_render_every_panel() {
        let (mut app, _rx) = make_app(Arc::new(ScriptedApi::new()));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let expected = [
            "Sin alertas recientes",
            "no log lines yet",
            "No hay alertas registradas",
            "No hay IPs bloqueadas",
            "[daemon]",
        ];
        for (i, needle) in expected.iter().enumerate() {
            app.handle_action(Action::GoToPanel(i));
            terminal.draw(|frame| app.render(frame)).unwrap();
            assert!(screen(&terminal).contains(needle), "panel {i} missing {needle:?}");
        }
    }
}
