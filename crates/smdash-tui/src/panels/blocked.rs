//! Blocked panel: IPs the daemon is blocking, with a selection cursor for
//! unblock requests.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use smdash_core::DashboardSession;
use smdash_core::blocked::BlockedListView;

use super::PanelState;

pub struct BlockedPanel {
    selected: usize,
    len: usize,
}

impl BlockedPanel {
    pub fn new() -> Self {
        Self {
            selected: 0,
            len: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Track the list length, keeping the cursor on a valid row.
    pub fn sync(&mut self, len: usize) {
        self.len = len;
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// The IP under the cursor, if the list is not empty.
    pub fn selected_ip<'a>(&self, view: &'a BlockedListView) -> Option<&'a str> {
        view.get(self.selected)
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, session: &DashboardSession) {
        let view = session.blocked();
        self.sync(view.len());

        let title = format!(
            " Blocked ({}) · x: {} ",
            view.len(),
            session.labels().unblock
        );
        let block = Block::default().title(title).borders(Borders::ALL);

        if view.is_empty() {
            let empty = Paragraph::new(format!("  {}", session.labels().no_blocked))
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = view
            .items
            .iter()
            .map(|ip| ListItem::new(ip.as_str()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

impl Default for BlockedPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelState for BlockedPanel {
    fn scroll_down(&mut self, n: usize) {
        let max = self.len.saturating_sub(1);
        self.selected = (self.selected + n).min(max);
    }

    fn scroll_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    fn scroll_to_top(&mut self) {
        self.selected = 0;
    }

    fn scroll_to_bottom(&mut self) {
        self.selected = self.len.saturating_sub(1);
    }
}
