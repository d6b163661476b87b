use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the confirm dialog that parent needs to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEvent {
  Confirmed,
  Cancelled,
}

/// Yes/no overlay guarding destructive actions like deletes
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
  active: bool,
  title: String,
  message: String,
}

impl ConfirmDialog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if dialog is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the dialog with a title and message
  pub fn show(&mut self, title: impl Into<String>, message: impl Into<String>) {
    self.active = true;
    self.title = title.into();
    self.message = message.into();
  }

  /// Hide the dialog
  pub fn hide(&mut self) {
    self.active = false;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
        self.hide();
        KeyResult::Event(ConfirmEvent::Confirmed)
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(ConfirmEvent::Cancelled)
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the dialog overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (self.message.len() as u16 + 6)
      .max(self.title.len() as u16 + 6)
      .max(30)
      .min(area.width.saturating_sub(4));
    let height = 4.min(area.height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let lines = vec![
      Line::from(self.message.clone()),
      Line::from(vec![
        Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("es / "),
        Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw("o"),
      ]),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
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
  fn test_confirm_with_y() {
    let mut dialog = ConfirmDialog::new();
    dialog.show("Delete user", "Delete Olivia Hale?");
    let result = dialog.handle_key(key(KeyCode::Char('y')));
    assert_eq!(result, KeyResult::Event(ConfirmEvent::Confirmed));
    assert!(!dialog.is_active());
  }

  #[test]
  fn test_cancel_with_escape() {
    let mut dialog = ConfirmDialog::new();
    dialog.show("Delete user", "Delete Olivia Hale?");
    let result = dialog.handle_key(key(KeyCode::Esc));
    assert_eq!(result, KeyResult::Event(ConfirmEvent::Cancelled));
    assert!(!dialog.is_active());
  }

  #[test]
  fn test_inactive_dialog_passes_keys_through() {
    let mut dialog = ConfirmDialog::new();
    let result = dialog.handle_key(key(KeyCode::Char('y')));
    assert_eq!(result, KeyResult::NotHandled);
  }
}
