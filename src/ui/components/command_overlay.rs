use crate::commands::Command;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

/// Rows of suggestions shown at once; the list scrolls past this.
const VISIBLE_ROWS: u16 = 8;

/// Command palette: an input line with the `:` prefix, matching commands
/// underneath. Aliases are listed so the short forms are discoverable.
pub fn draw_command_overlay(
  frame: &mut Frame,
  area: Rect,
  input: &str,
  suggestions: &[&Command],
  selected_suggestion: usize,
) {
  let rows = if suggestions.is_empty() {
    1
  } else {
    (suggestions.len() as u16).min(VISIBLE_ROWS)
  };
  let width = (area.width * 3 / 5).clamp(44, 72).min(area.width);
  let height = (3 + rows).min(area.height);
  let overlay = Rect::new(area.x + 1, area.y + 1, width, height);

  frame.render_widget(Clear, overlay);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(" Command ");
  let inner = block.inner(overlay);
  frame.render_widget(block, overlay);

  if inner.height == 0 {
    return;
  }

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Min(0)])
    .split(inner);

  let prompt = Line::from(vec![
    Span::styled(":", Style::default().fg(Color::Yellow)),
    Span::raw(input),
    Span::styled("_", Style::default().fg(Color::Yellow)),
  ]);
  frame.render_widget(Paragraph::new(prompt), chunks[0]);

  if chunks[1].height == 0 {
    return;
  }

  if suggestions.is_empty() {
    let hint = Paragraph::new("no matching command").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, chunks[1]);
    return;
  }

  // The full set goes into the list; ListState keeps the selection in view.
  let items: Vec<ListItem> = suggestions
    .iter()
    .map(|cmd| {
      let aliases = cmd.aliases.join(", ");
      ListItem::new(Line::from(vec![
        Span::styled(
          format!("{:<10}", cmd.name),
          Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("{:<16}", aliases), Style::default().fg(Color::Gray)),
        Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let list =
    List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
  let mut state = ListState::default();
  state.select(Some(selected_suggestion));
  frame.render_stateful_widget(list, chunks[1], &mut state);
}
