use super::{KeyResult, TextInput};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// One labelled input inside a [`Form`]. Masked fields echo bullets,
/// for passwords.
#[derive(Debug, Clone, Default)]
pub struct FormField {
  label: String,
  input: TextInput,
  masked: bool,
}

impl FormField {
  pub fn new(label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      input: TextInput::new(),
      masked: false,
    }
  }

  pub fn masked(mut self) -> Self {
    self.masked = true;
    self
  }

  pub fn with_value(mut self, value: impl Into<String>) -> Self {
    self.input.set_value(value);
    self
  }
}

/// Events emitted by the form that parent needs to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
  Submitted,
  Cancelled,
}

/// Overlay form with labelled fields and Tab navigation between them
#[derive(Debug, Clone, Default)]
pub struct Form {
  active: bool,
  title: String,
  fields: Vec<FormField>,
  focused: usize,
}

impl Form {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if form is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the form with the given fields, focus on the first
  pub fn show(&mut self, title: impl Into<String>, fields: Vec<FormField>) {
    self.active = true;
    self.title = title.into();
    self.fields = fields;
    self.focused = 0;
  }

  /// Hide the form and drop its contents
  pub fn hide(&mut self) {
    self.active = false;
    self.fields.clear();
    self.focused = 0;
  }

  /// Current value of the field at `index`, empty string when out of range
  pub fn value(&self, index: usize) -> &str {
    self.fields.get(index).map(|f| f.input.value()).unwrap_or("")
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.hide();
        KeyResult::Event(FormEvent::Cancelled)
      }
      KeyCode::Enter => KeyResult::Event(FormEvent::Submitted),
      KeyCode::Tab | KeyCode::Down => {
        if !self.fields.is_empty() {
          self.focused = (self.focused + 1) % self.fields.len();
        }
        KeyResult::Handled
      }
      KeyCode::BackTab | KeyCode::Up => {
        if !self.fields.is_empty() {
          self.focused = if self.focused == 0 {
            self.fields.len() - 1
          } else {
            self.focused - 1
          };
        }
        KeyResult::Handled
      }
      _ => {
        if let Some(field) = self.fields.get_mut(self.focused) {
          field.input.handle_key(key);
        }
        KeyResult::Handled
      }
    }
  }

  /// Render the form overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 6 / 10).clamp(36, 64).min(area.width.saturating_sub(2));
    let height = (self.fields.len() as u16 * 2 + 3).min(area.height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines = Vec::new();
    for (i, field) in self.fields.iter().enumerate() {
      let label_style = if i == self.focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      lines.push(Line::from(Span::styled(format!("{}:", field.label), label_style)));

      let shown = if field.masked {
        "\u{2022}".repeat(field.input.value().chars().count())
      } else {
        field.input.value().to_string()
      };
      let marker = if i == self.focused { "> " } else { "  " };
      lines.push(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::raw(shown),
      ]));
    }
    lines.push(Line::from(Span::styled(
      "Enter to save, Esc to cancel",
      Style::default().fg(Color::DarkGray),
    )));

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

  fn type_str(form: &mut Form, s: &str) {
    for c in s.chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_typing_goes_to_focused_field() {
    let mut form = Form::new();
    form.show("Login", vec![FormField::new("Email"), FormField::new("Password").masked()]);

    type_str(&mut form, "a@b.com");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "secret");

    assert_eq!(form.value(0), "a@b.com");
    assert_eq!(form.value(1), "secret");
  }

  #[test]
  fn test_backtab_wraps_to_last_field() {
    let mut form = Form::new();
    form.show("Edit", vec![FormField::new("Name"), FormField::new("Email")]);

    form.handle_key(key(KeyCode::BackTab));
    type_str(&mut form, "x");
    assert_eq!(form.value(1), "x");
  }

  #[test]
  fn test_enter_submits_without_clearing() {
    let mut form = Form::new();
    form.show("Edit", vec![FormField::new("Name").with_value("Villa")]);

    let result = form.handle_key(key(KeyCode::Enter));
    assert_eq!(result, KeyResult::Event(FormEvent::Submitted));
    assert!(form.is_active());
    assert_eq!(form.value(0), "Villa");
  }

  #[test]
  fn test_escape_cancels_and_drops_values() {
    let mut form = Form::new();
    form.show("Edit", vec![FormField::new("Name").with_value("Villa")]);

    let result = form.handle_key(key(KeyCode::Esc));
    assert_eq!(result, KeyResult::Event(FormEvent::Cancelled));
    assert!(!form.is_active());
    assert_eq!(form.value(0), "");
  }
}
