use crate::ui::view::{ShortcutInfo, ShortcutVisibility};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, backend context, and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  api_url: &str,
  title: Option<&str>,
  admin: &str,
  shortcuts: &[ShortcutInfo],
) {
  // Named deployments override the raw domain
  let context = title.unwrap_or_else(|| extract_domain(api_url));

  let mut spans = vec![
    Span::styled(" p9s ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", context), Style::default().fg(Color::White)),
  ];

  if !admin.is_empty() {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" {} ", admin),
      Style::default().fg(Color::Yellow).bold(),
    ));
  }

  spans.push(Span::raw("  "));

  // Shortcuts - keys and brackets highlighted, descriptions dimmed
  let mut ordered: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  ordered.sort_by_key(|s| s.priority);
  for (i, shortcut) in ordered.iter().enumerate() {
    if i > 0 {
      spans.push(Span::raw("   "));
    }
    // Transient shortcuts (an open overlay) stand out from the resident set
    let key_color = match shortcut.visibility {
      ShortcutVisibility::Always => Color::Cyan,
      ShortcutVisibility::WhenActive => Color::Yellow,
    };
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(key_color),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

/// Extract domain from the backend URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_domain() {
    assert_eq!(
      extract_domain("https://api.homenest.example/api/v1"),
      "api.homenest.example"
    );
    assert_eq!(extract_domain("http://localhost:5000/api/v1"), "localhost:5000");
    assert_eq!(extract_domain("localhost:5000"), "localhost:5000");
  }
}
