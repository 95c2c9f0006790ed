//! Alerts panel: the newest alerts as a table.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use smdash_core::DashboardSession;
use smdash_core::alerts::{AlertRow, Severity};

use super::PanelState;

pub struct AlertsPanel {
    scroll_offset: usize,
    /// Row count seen on the last draw; bounds scrolling.
    rows: usize,
}

impl AlertsPanel {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0,
            rows: 0,
        }
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Track the current row count, pulling the offset back in range.
    pub fn sync(&mut self, rows: usize) {
        self.rows = rows;
        self.scroll_offset = self.scroll_offset.min(rows.saturating_sub(1));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, session: &DashboardSession) {
        let view = session.alerts();
        self.sync(view.rows.len());

        let mut title = format!(" {} ", session.alert_count_label());
        if view.rows.len() < view.total {
            title = format!(" {} (latest {}) ", session.alert_count_label(), view.rows.len());
        }
        let block = Block::default().title(title).borders(Borders::ALL);

        if view.is_empty() {
            let empty = Paragraph::new(format!("  {}", session.labels().no_alerts))
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let rows: Vec<Row> = view
            .rows
            .iter()
            .skip(self.scroll_offset)
            .map(alert_row)
            .collect();

        let widths = [
            Constraint::Length(19),
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Length(4),
            Constraint::Length(8),
            Constraint::Min(10),
        ];
        let table = Table::new(rows, widths)
            .header(
                Row::new(vec!["When", "Service", "IP", "CC", "Severity", "Message"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(block);
        frame.render_widget(table, area);
    }
}

impl Default for AlertsPanel {
    fn default() -> Self {
        Self::new()
    }
}

pub fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::High => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Severity::Medium => Style::default().fg(Color::Yellow),
        Severity::Low => Style::default().fg(Color::Gray),
    }
}

fn alert_row(row: &AlertRow) -> Row<'_> {
    Row::new(vec![
        Cell::from(row.when.as_str()),
        Cell::from(row.service.as_str()),
        Cell::from(row.ip.as_str()),
        Cell::from(row.country.as_str()),
        Cell::from(Span::styled(
            row.severity_label.as_str(),
            severity_style(row.severity),
        )),
        Cell::from(row.message.as_str()),
    ])
}

impl PanelState for AlertsPanel {
    fn scroll_down(&mut self, n: usize) {
        let max = self.rows.saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + n).min(max);
    }

    fn scroll_up(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.rows.saturating_sub(1);
    }
}
