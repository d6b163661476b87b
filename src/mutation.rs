//! One-shot write operations.
//!
//! A `Mutation` runs a single API call off the event loop and, on success,
//! invalidates exactly the collection it rewrote so the viewers refetch.
//! Nothing is patched into the cache directly; the server's copy is the
//! only truth. While one run is out, further runs are ignored, which is
//! what keeps a double keypress from double-deleting.

use std::future::Future;

use tokio::sync::mpsc;

use crate::notify::Notifier;
use crate::query::QueryCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
  Success,
  Failed,
}

pub struct Mutation {
  cache: QueryCache,
  notifier: Notifier,
  /// Key prefix of the collection this mutation rewrites.
  invalidates: &'static str,
  receiver: Option<mpsc::UnboundedReceiver<Result<String, String>>>,
}

impl Mutation {
  pub fn new(cache: QueryCache, notifier: Notifier, invalidates: &'static str) -> Self {
    Self {
      cache,
      notifier,
      invalidates,
      receiver: None,
    }
  }

  pub fn is_running(&self) -> bool {
    self.receiver.is_some()
  }

  /// Start `op` unless a run is already out. `success` becomes the toast
  /// when the operation lands cleanly.
  pub fn run<Fut>(&mut self, success: impl Into<String>, op: Fut)
  where
    Fut: Future<Output = Result<(), String>> + Send + 'static,
  {
    if self.is_running() {
      return;
    }
    let success = success.into();
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    tokio::spawn(async move {
      let result = op.await.map(|_| success);
      let _ = tx.send(result);
    });
  }

  /// Collect the outcome, if one landed. Success invalidates the owned
  /// collection and posts the toast; failure only posts the server's
  /// message. Call this from the event loop tick.
  pub fn poll(&mut self) -> Option<MutationOutcome> {
    let receiver = self.receiver.as_mut()?;
    match receiver.try_recv() {
      Ok(Ok(message)) => {
        self.receiver = None;
        self.cache.invalidate(self.invalidates);
        self.notifier.success(message);
        Some(MutationOutcome::Success)
      }
      Ok(Err(error)) => {
        self.receiver = None;
        self.notifier.error(error);
        Some(MutationOutcome::Failed)
      }
      Err(mpsc::error::TryRecvError::Empty) => None,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        self.receiver = None;
        None
      }
    }
  }
}
