//! Transient status notifications.
//!
//! Mutations report their outcome here and the footer renders the front of
//! the queue until it expires. The queue is shared the same way the session
//! is, so background tasks can post from any thread.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Info,
  Success,
  Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
  pub level: Level,
  pub message: String,
  posted_at: Instant,
}

#[derive(Clone)]
pub struct Notifier {
  queue: Arc<Mutex<VecDeque<Toast>>>,
  ttl: Duration,
}

impl Default for Notifier {
  fn default() -> Self {
    Self::with_ttl(DEFAULT_TTL)
  }
}

impl Notifier {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_ttl(ttl: Duration) -> Self {
    Self {
      queue: Arc::new(Mutex::new(VecDeque::new())),
      ttl,
    }
  }

  pub fn info(&self, message: impl Into<String>) {
    self.push(Level::Info, message.into());
  }

  pub fn success(&self, message: impl Into<String>) {
    self.push(Level::Success, message.into());
  }

  pub fn error(&self, message: impl Into<String>) {
    self.push(Level::Error, message.into());
  }

  /// The toast the footer should show right now. Expired entries are pruned
  /// on the way, so a burst of outcomes plays through in order.
  pub fn current(&self) -> Option<Toast> {
    let mut queue = self.lock();
    while let Some(front) = queue.front() {
      if front.posted_at.elapsed() >= self.ttl {
        queue.pop_front();
      } else {
        return Some(front.clone());
      }
    }
    None
  }

  /// Drop the visible toast early.
  #[allow(dead_code)]
  pub fn dismiss(&self) {
    self.lock().pop_front();
  }

  fn push(&self, level: Level, message: String) {
    self.lock().push_back(Toast {
      level,
      message,
      posted_at: Instant::now(),
    });
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Toast>> {
    self.queue.lock().unwrap_or_else(|e| e.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_toasts_play_in_posting_order() {
    let notifier = Notifier::new();
    notifier.success("Agent Approved Successfully!");
    notifier.error("request failed");

    let first = notifier.current().unwrap();
    assert_eq!(first.level, Level::Success);
    assert_eq!(first.message, "Agent Approved Successfully!");

    notifier.dismiss();
    let second = notifier.current().unwrap();
    assert_eq!(second.level, Level::Error);

    notifier.dismiss();
    assert!(notifier.current().is_none());
  }

  #[test]
  fn test_expired_toasts_are_pruned() {
    let notifier = Notifier::with_ttl(Duration::ZERO);
    notifier.info("gone immediately");
    assert!(notifier.current().is_none());
  }
}
