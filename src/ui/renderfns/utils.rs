use chrono::DateTime;
use ratatui::prelude::Color;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Get the display color for a transaction or plan status
pub fn status_color(status: &str) -> Color {
  match status.to_ascii_lowercase().as_str() {
    "completed" | "paid" | "active" | "success" => Color::Green,
    "pending" => Color::Yellow,
    "failed" | "canceled" | "cancelled" | "inactive" | "rejected" => Color::Red,
    _ => Color::White,
  }
}

/// Format an RFC 3339 timestamp as "Jan 02, 2025", falling back to the
/// raw value when the backend sends something else
pub fn fmt_date(raw: &str) -> String {
  match DateTime::parse_from_rfc3339(raw) {
    Ok(dt) => dt.format("%b %d, %Y").to_string(),
    Err(_) => raw.to_string(),
  }
}

/// Format a payment amount with its currency
pub fn fmt_amount(amount: f64, currency: &str) -> String {
  match currency.to_ascii_lowercase().as_str() {
    "usd" => format!("${:.2}", amount),
    "eur" => format!("\u{20ac}{:.2}", amount),
    other => format!("{:.2} {}", amount, other.to_uppercase()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Вилла на побережье", 8), "Вилла...");
  }

  #[test]
  fn test_status_color_positive() {
    assert_eq!(status_color("completed"), Color::Green);
    assert_eq!(status_color("Active"), Color::Green);
  }

  #[test]
  fn test_status_color_pending() {
    assert_eq!(status_color("pending"), Color::Yellow);
  }

  #[test]
  fn test_status_color_negative() {
    assert_eq!(status_color("failed"), Color::Red);
    assert_eq!(status_color("inactive"), Color::Red);
  }

  #[test]
  fn test_status_color_default() {
    assert_eq!(status_color("open"), Color::White);
  }

  #[test]
  fn test_fmt_date() {
    assert_eq!(fmt_date("2025-01-02T03:04:05.000Z"), "Jan 02, 2025");
    assert_eq!(fmt_date("yesterday"), "yesterday");
  }

  #[test]
  fn test_fmt_amount() {
    assert_eq!(fmt_amount(49.0, "usd"), "$49.00");
    assert_eq!(fmt_amount(12.5, "gbp"), "12.50 GBP");
  }
}
