use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum Event {
  /// Terminal key press. Release and repeat reports are filtered out before
  /// they get here.
  Key(KeyEvent),
  /// Terminal was resized; wakes the loop for a redraw.
  Resize,
  /// Clock tick driving debounce, query polling, and toast expiry.
  Tick,
}

/// Forwards terminal input and a steady tick into one channel.
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
      // Ticks are paced off the clock, not off poll gaps, so a burst of key
      // events never delays them.
      let mut last_tick = Instant::now();
      loop {
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).unwrap_or(false) {
          match event::read() {
            Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
              if tx.send(Event::Key(key)).is_err() {
                break;
              }
            }
            Ok(CrosstermEvent::Resize(_, _)) => {
              if tx.send(Event::Resize).is_err() {
                break;
              }
            }
            _ => {}
          }
        }
        if last_tick.elapsed() >= tick_rate {
          last_tick = Instant::now();
          if tx.send(Event::Tick).is_err() {
            break;
          }
        }
      }
    });

    Self { rx }
  }

  /// The next event, or `None` once the reader task is gone.
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
