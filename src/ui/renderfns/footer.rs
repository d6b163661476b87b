use crate::notify::{Level, Toast};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar with view breadcrumb and the current notification
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], toast: Option<&Toast>) {
  let mut spans = Vec::new();

  spans.push(Span::raw(" "));

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      // Current view - highlighted
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  let (crumb_area, toast_area) = match toast {
    Some(toast) => {
      let width = (toast.message.chars().count() as u16 + 2).min(area.width / 2);
      let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(width)])
        .split(area);
      (chunks[0], Some(chunks[1]))
    }
    None => (area, None),
  };

  let line = Line::from(spans);
  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, crumb_area);

  if let (Some(toast), Some(toast_area)) = (toast, toast_area) {
    let color = match toast.level {
      Level::Success => Color::Green,
      Level::Error => Color::Red,
      Level::Info => Color::Cyan,
    };
    let para = Paragraph::new(Line::from(Span::styled(
      format!("{} ", toast.message),
      Style::default().fg(color).bold(),
    )))
    .style(Style::default().bg(Color::Black))
    .alignment(Alignment::Right);
    frame.render_widget(para, toast_area);
  }
}
