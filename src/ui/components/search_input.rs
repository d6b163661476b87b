use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::view::{ShortcutInfo, ShortcutProvider};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Search text changed (emitted on each keystroke, empty string on cancel).
  /// The parent decides when the text actually becomes a request; the list
  /// views debounce it.
  Changed(String),
  /// Search submitted (overlay closed, term applies immediately)
  Submitted,
}

/// The `/` search overlay the list views share.
///
/// Reopening it keeps the applied term so it can be refined in place;
/// Ctrl-u wipes it, Esc clears the search entirely.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  placeholder: &'static str,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Dim hint shown while the field is empty, naming what the backend
  /// matches against.
  pub fn with_placeholder(mut self, placeholder: &'static str) -> Self {
    self.placeholder = placeholder;
    self
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open the overlay. The previous term stays put, cursor at the end.
  fn activate(&mut self) {
    self.active = true;
  }

  /// Handle a key event. Call this regardless of active state; `/` opens
  /// the overlay, everything else is ignored until it is open.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted)
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(SearchEvent::Changed(String::new()))
      }
      InputResult::Consumed => {
        KeyResult::Event(SearchEvent::Changed(self.input.value().to_string()))
      }
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// Render the overlay if active.
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 3 / 5).clamp(30, 60).min(area.width);
    let overlay = Rect::new(area.x + 1, area.y + 1, width, 3.min(area.height));

    frame.render_widget(Clear, overlay);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Search ");
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    if inner.height == 0 {
      return;
    }

    let line = if self.input.value().is_empty() && !self.placeholder.is_empty() {
      Line::from(vec![
        Span::styled("/", Style::default().fg(Color::Yellow)),
        Span::styled("_", Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(self.placeholder, Style::default().fg(Color::DarkGray)),
      ])
    } else {
      Line::from(vec![
        Span::styled("/", Style::default().fg(Color::Yellow)),
        Span::raw(self.input.value()),
        Span::styled("_", Style::default().fg(Color::Yellow)),
      ])
    };
    frame.render_widget(Paragraph::new(line), inner);
  }
}

impl ShortcutProvider for SearchInput {
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if !self.active {
      return Vec::new();
    }
    vec![
      ShortcutInfo::new("Enter", "apply").with_priority(80).when_active(),
      ShortcutInfo::new("Esc", "cancel").with_priority(81).when_active(),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_slash_opens_then_keystrokes_emit_changed() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('x'))), KeyResult::NotHandled);

    assert_eq!(search.handle_key(key(KeyCode::Char('/'))), KeyResult::Handled);
    assert!(search.is_active());
    assert_eq!(
      search.handle_key(key(KeyCode::Char('a'))),
      KeyResult::Event(SearchEvent::Changed("a".to_string()))
    );
  }

  #[test]
  fn test_escape_closes_and_clears() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')));
    search.handle_key(key(KeyCode::Char('a')));
    search.handle_key(key(KeyCode::Char('b')));

    assert_eq!(
      search.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(SearchEvent::Changed(String::new()))
    );
    assert!(!search.is_active());

    // Nothing left over when it reopens.
    search.handle_key(key(KeyCode::Char('/')));
    assert_eq!(
      search.handle_key(key(KeyCode::Char('c'))),
      KeyResult::Event(SearchEvent::Changed("c".to_string()))
    );
  }

  #[test]
  fn test_submitted_term_survives_reopening() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')));
    search.handle_key(key(KeyCode::Char('o')));
    search.handle_key(key(KeyCode::Char('l')));
    assert_eq!(
      search.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(SearchEvent::Submitted)
    );
    assert!(!search.is_active());

    // Reopen and refine in place.
    search.handle_key(key(KeyCode::Char('/')));
    assert_eq!(
      search.handle_key(key(KeyCode::Char('i'))),
      KeyResult::Event(SearchEvent::Changed("oli".to_string()))
    );
  }
}
