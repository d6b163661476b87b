use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// One selectable entry. Disabled entries stay visible but cannot be picked,
/// mirroring a greyed-out button: Approve on an already approved agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerItem {
  pub label: String,
  pub value: String,
  pub enabled: bool,
}

impl PickerItem {
  pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      value: value.into(),
      enabled: true,
    }
  }

  pub fn disabled(mut self, disabled: bool) -> Self {
    self.enabled = !disabled;
    self
  }
}

/// Events emitted by the picker that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
  /// An enabled item was picked (returns its value)
  Picked(String),
  /// Picker cancelled
  Cancelled,
}

/// Overlay list for choosing one of a few actions or filter values
#[derive(Debug, Clone, Default)]
pub struct Picker {
  active: bool,
  items: Vec<PickerItem>,
  selected: usize,
  title: String,
}

impl Picker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if picker is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the picker with the given items
  pub fn show(&mut self, title: impl Into<String>, items: Vec<PickerItem>) {
    self.active = true;
    self.items = items;
    self.selected = 0;
    self.title = title.into();
  }

  /// Hide the picker
  pub fn hide(&mut self) {
    self.active = false;
    self.items.clear();
    self.selected = 0;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(PickerEvent::Cancelled)
      }
      KeyCode::Enter => match self.items.get(self.selected) {
        // A disabled entry swallows Enter; the picker stays open
        Some(item) if !item.enabled => KeyResult::Handled,
        Some(item) => {
          let value = item.value.clone();
          self.hide();
          KeyResult::Event(PickerEvent::Picked(value))
        }
        None => {
          self.hide();
          KeyResult::Event(PickerEvent::Cancelled)
        }
      },
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.items.is_empty() {
          self.selected = (self.selected + 1) % self.items.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.items.is_empty() {
          self.selected = if self.selected == 0 {
            self.items.len() - 1
          } else {
            self.selected - 1
          };
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.items.is_empty() {
      return;
    }

    // Calculate overlay dimensions
    let max_label_len = self
      .items
      .iter()
      .map(|item| item.label.len())
      .max()
      .unwrap_or(10)
      .max(self.title.len() + 2);
    let width = (max_label_len as u16 + 6).min(area.width.saturating_sub(4)).max(20);
    let height = (self.items.len() as u16 + 2)
      .min(area.height.saturating_sub(4))
      .max(3);

    // Center the overlay
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    let overlay_area = Rect::new(x, y, width, height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    // Draw the border/block
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = self
      .items
      .iter()
      .map(|item| {
        let style = if item.enabled {
          Style::default().fg(Color::Cyan)
        } else {
          Style::default().fg(Color::DarkGray)
        };
        ListItem::new(Line::from(vec![Span::styled(item.label.clone(), style)]))
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
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
  fn test_picking_an_enabled_item() {
    let mut picker = Picker::new();
    picker.show(
      "Actions",
      vec![
        PickerItem::new("Approve", "approve"),
        PickerItem::new("Reject", "reject"),
      ],
    );

    picker.handle_key(key(KeyCode::Char('j')));
    let result = picker.handle_key(key(KeyCode::Enter));
    assert_eq!(result, KeyResult::Event(PickerEvent::Picked("reject".to_string())));
    assert!(!picker.is_active());
  }

  #[test]
  fn test_disabled_item_swallows_enter() {
    let mut picker = Picker::new();
    picker.show(
      "Actions",
      vec![
        PickerItem::new("Approve", "approve").disabled(true),
        PickerItem::new("Reject", "reject"),
      ],
    );

    let result = picker.handle_key(key(KeyCode::Enter));
    assert_eq!(result, KeyResult::Handled);
    assert!(picker.is_active());
  }

  #[test]
  fn test_escape_cancels() {
    let mut picker = Picker::new();
    picker.show("Filter", vec![PickerItem::new("All", "all")]);
    let result = picker.handle_key(key(KeyCode::Esc));
    assert_eq!(result, KeyResult::Event(PickerEvent::Cancelled));
    assert!(!picker.is_active());
  }
}
