//! Overview panel: daemon status, connection health, service counters.

use chrono::{DateTime, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use smdash_config::AppConfig;
use smdash_core::DashboardSession;
use smdash_core::connection::ConnectionHealth;

use super::{PanelState, badge_span};

pub struct OverviewPanel {
    pub base_url: String,
    pub interval_ms: u64,
}

impl OverviewPanel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            base_url: config.daemon.base_url.clone(),
            interval_ms: config.poll.interval_ms,
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        session: &DashboardSession,
        now: DateTime<Utc>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(6),
                Constraint::Min(0),
            ])
            .split(area);

        let header = session.header();
        let last_alert = session.last_alert_pill(now);
        let label = Style::default().fg(Color::Gray);
        let status_text = vec![
            Line::from(vec![
                Span::styled("Status:     ", label),
                badge_span(&header.badge),
            ]),
            Line::from(vec![
                Span::styled("Daemon:     ", label),
                badge_span(&header.pill),
            ]),
            Line::from(vec![
                Span::styled("Connection: ", label),
                health_span(session.health(), session.failures()),
            ]),
            Line::from(vec![
                Span::styled("Alerts:     ", label),
                badge_span(&last_alert),
            ]),
        ];
        let status = Paragraph::new(status_text)
            .block(Block::default().title(" Status ").borders(Borders::ALL));
        frame.render_widget(status, chunks[0]);

        let stats = session.stats();
        let rows = [("SSH", stats.ssh), ("FTP", stats.ftp), ("Apache", stats.apache)]
            .into_iter()
            .map(|(service, count)| {
                Row::new(vec![Cell::from(service), Cell::from(count.to_string())])
            });
        let table = Table::new(rows, [Constraint::Length(10), Constraint::Min(8)])
            .header(
                Row::new(vec!["Service", "Events"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().title(" Services ").borders(Borders::ALL));
        frame.render_widget(table, chunks[1]);

        let settings = vec![
            Row::new(vec![Cell::from("Daemon"), Cell::from(self.base_url.as_str())]),
            Row::new(vec![
                Cell::from("Poll every"),
                Cell::from(format!("{} ms", self.interval_ms)),
            ]),
            Row::new(vec![
                Cell::from("Classifier"),
                Cell::from(session.classifier_name()),
            ]),
            Row::new(vec![
                Cell::from("Log lines"),
                Cell::from(session.feed().len().to_string()),
            ]),
        ];
        let table = Table::new(settings, [Constraint::Length(12), Constraint::Min(10)])
            .block(Block::default().title(" Client ").borders(Borders::ALL));
        frame.render_widget(table, chunks[2]);
    }
}

fn health_span(health: ConnectionHealth, failures: u32) -> Span<'static> {
    match health {
        ConnectionHealth::Healthy => Span::styled("healthy", Style::default().fg(Color::Green)),
        ConnectionHealth::Degraded => Span::styled(
            format!("degraded ({failures} failed)"),
            Style::default().fg(Color::Yellow),
        ),
        ConnectionHealth::Disconnected => Span::styled(
            format!("disconnected ({failures} failed)"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    }
}

// Fits on one screen.
impl PanelState for OverviewPanel {
    fn scroll_down(&mut self, _n: usize) {}
    fn scroll_up(&mut self, _n: usize) {}
    fn scroll_to_top(&mut self) {}
    fn scroll_to_bottom(&mut self) {}
}
