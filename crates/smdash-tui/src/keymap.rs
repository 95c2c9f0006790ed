//! Vim-style keybindings.
//!
//! Maps key codes to actions. Supports single keys and the `gg` sequence.

use crossterm::event::KeyCode;

/// Something the user asked the TUI to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextPanel,
    PrevPanel,
    GoToPanel(usize),
    ScrollDown,
    ScrollUp,
    HalfPageDown,
    HalfPageUp,
    ScrollToTop,
    ScrollToBottom,
    /// Fetch a snapshot now.
    Refresh,
    /// Unblock the IP selected in the blocked list.
    Unblock,
    None,
}

/// Key mapper with support for two-key sequences.
pub struct KeyMapper {
    pending: Option<KeyCode>,
}

impl KeyMapper {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Feed a key code and return the resolved action.
    ///
    /// A key that starts a sequence yields `Action::None` until the next
    /// key arrives.
    pub fn resolve(&mut self, key: KeyCode) -> Action {
        if let Some(prev) = self.pending.take() {
            return self.resolve_sequence(prev, key);
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,

            KeyCode::Tab | KeyCode::Char('l') => Action::NextPanel,
            KeyCode::BackTab | KeyCode::Char('h') => Action::PrevPanel,
            KeyCode::Char(c @ '1'..='5') => Action::GoToPanel(c as usize - '1' as usize),

            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('d') | KeyCode::PageDown => Action::HalfPageDown,
            KeyCode::Char('u') | KeyCode::PageUp => Action::HalfPageUp,
            KeyCode::Char('G') | KeyCode::End => Action::ScrollToBottom,
            KeyCode::Home => Action::ScrollToTop,

            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('x') | KeyCode::Enter => Action::Unblock,

            KeyCode::Char('g') => {
                self.pending = Some(key);
                Action::None
            }

            _ => Action::None,
        }
    }

    fn resolve_sequence(&mut self, first: KeyCode, second: KeyCode) -> Action {
        match (first, second) {
            (KeyCode::Char('g'), KeyCode::Char('g')) => Action::ScrollToTop,
            _ => self.resolve(second),
        }
    }
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new()
    }
}
