//! Async query abstraction for data fetching with caching support.
//!
//! Inspired by TanStack Query, this module provides a `Query<T>` type that
//! encapsulates async data fetching, loading states, and error handling.
//! Keyed queries additionally share a [`QueryCache`]: a fresh cached result
//! is served without touching the network, at most one fetch per key is in
//! the air at a time, and a mutation can invalidate a whole collection by
//! key prefix to make its viewers refetch.
//!
//! # Example
//!
//! ```ignore
//! let api = ctx.api.clone();
//! let mut query = Query::keyed(
//!     QueryKey::new("payment/"),
//!     ctx.cache.clone(),
//!     move || {
//!         let api = api.clone();
//!         async move { api.transactions().await.map_err(|e| e.to_string()) }
//!     },
//! );
//!
//! // Start fetching (or adopt a cached result)
//! query.fetch();
//!
//! // In event loop tick
//! if query.tick() {
//!     // State changed, trigger re-render
//! }
//!
//! // In render
//! match query.state() {
//!     QueryState::Loading => render_spinner(),
//!     QueryState::Success(data) => render_data(data),
//!     QueryState::Error(e) => render_error(e),
//!     QueryState::Idle => {}
//! }
//! ```

mod cache;
mod key;

pub use cache::{Flight, QueryCache};
pub use key::QueryKey;

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A boxed future that returns a Result<T, String>
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Async query for data fetching with state management.
///
/// Query<T> encapsulates:
/// - The fetching logic (via a closure)
/// - Loading/success/error states
/// - Async result handling via channels
/// - An optional cache slot shared with other queries for the same key
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
  fetched_at: Option<Instant>,
  stale_time: Duration,
  slot: Option<(QueryKey, QueryCache)>,
  /// Waiting for another query's in-flight fetch of the same key.
  shared_wait: bool,
}

impl<T> Query<T>
where
  T: Serialize + DeserializeOwned + Send + 'static,
{
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure that returns a future. It will be called
  /// each time `fetch()` or `refetch()` is invoked.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
      fetched_at: None,
      stale_time: Duration::from_secs(60),
      slot: None,
      shared_wait: false,
    }
  }

  /// Create a query bound to a cache slot.
  ///
  /// `fetch()` serves a fresh cached result synchronously, and concurrent
  /// queries for the same key share a single network fetch.
  pub fn keyed<F, Fut>(key: QueryKey, cache: QueryCache, fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    let mut query = Self::new(fetcher);
    query.slot = Some((key, cache));
    query
  }

  /// Set the stale time for this query.
  ///
  /// After this duration, the data is considered stale and `is_stale()` returns true.
  #[allow(dead_code)]
  pub fn with_stale_time(mut self, duration: Duration) -> Self {
    self.stale_time = duration;
    self
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Get the data if the query succeeded.
  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  /// Check if the query is currently loading.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Check if the query succeeded.
  pub fn is_success(&self) -> bool {
    self.state.is_success()
  }

  /// Check if the query failed.
  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  /// Get the error message if the query failed.
  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Check if the data is stale (older than stale_time).
  pub fn is_stale(&self) -> bool {
    match &self.state {
      QueryState::Success(_) => self
        .fetched_at
        .map(|t| t.elapsed() > self.stale_time)
        .unwrap_or(true),
      _ => false,
    }
  }

  /// Start fetching data if not already loading.
  ///
  /// For keyed queries a fresh cached result resolves synchronously, and a
  /// fetch already in the air for the same key is joined instead of
  /// duplicated. This is a no-op if the query is already loading.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    if let Some(value) = self.cached_fresh() {
      match serde_json::from_value(value) {
        Ok(data) => {
          self.state = QueryState::Success(data);
          self.fetched_at = Some(Instant::now());
          return;
        }
        Err(_) => {} // cached shape no longer decodes; fetch over the network
      }
    }
    self.start_fetch();
  }

  /// Force a refetch, even if already loading or data exists.
  ///
  /// A keyed refetch supersedes any fetch currently holding the key, so a
  /// result requested before this point can no longer repopulate the cache.
  pub fn refetch(&mut self) {
    // Cancel any pending fetch by dropping the receiver
    self.receiver = None;
    self.shared_wait = false;
    let flight = self.slot.as_ref().map(|(key, cache)| cache.reclaim(key));
    self.spawn_fetch(flight);
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    if self.shared_wait {
      return self.poll_shared();
    }

    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    // Try to receive without blocking
    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.fetched_at = Some(Instant::now());
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending - treat as error
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  /// `poll` plus invalidation handling: when a mutation has marked this
  /// query's slot stale, a refetch starts automatically.
  pub fn tick(&mut self) -> bool {
    let mut changed = self.poll();
    let invalidated = self
      .slot
      .as_ref()
      .map(|(key, cache)| self.is_success() && cache.is_stale(key))
      .unwrap_or(false);
    if invalidated {
      self.refetch();
      changed = true;
    }
    changed
  }

  fn cached_fresh(&self) -> Option<serde_json::Value> {
    let (key, cache) = self.slot.as_ref()?;
    cache.fresh(key)
  }

  /// Wait on another query's fetch of the same key. Adopts the stored
  /// result when it lands, or takes the key over when the owner failed.
  fn poll_shared(&mut self) -> bool {
    let Some((key, cache)) = self.slot.clone() else {
      self.shared_wait = false;
      return false;
    };
    if let Some(value) = cache.fresh(&key) {
      self.shared_wait = false;
      match serde_json::from_value(value) {
        Ok(data) => {
          self.state = QueryState::Success(data);
          self.fetched_at = Some(Instant::now());
        }
        Err(err) => self.state = QueryState::Error(err.to_string()),
      }
      return true;
    }
    if !cache.is_in_flight(&key) {
      // The fetch this query was waiting on ended without storing.
      self.shared_wait = false;
      self.start_fetch();
    }
    false
  }

  /// Internal: claim the key (or join its holder) and start the fetch.
  fn start_fetch(&mut self) {
    let flight = match &self.slot {
      Some((key, cache)) => match cache.begin(key) {
        Some(flight) => Some(flight),
        None => {
          self.receiver = None;
          self.state = QueryState::Loading;
          self.shared_wait = true;
          return;
        }
      },
      None => None,
    };
    self.spawn_fetch(flight);
  }

  fn spawn_fetch(&mut self, flight: Option<Flight>) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;
    self.shared_wait = false;

    if let Some((key, _)) = &self.slot {
      debug!(key = %key.render(), "fetch dispatched");
    }

    let future = (self.fetcher)();
    let slot = self.slot.clone();
    tokio::spawn(async move {
      let result = future.await;
      // The task owns the cache write so the slot settles even when this
      // query is dropped before the result arrives.
      if let (Some((key, cache)), Some(flight)) = (&slot, flight) {
        match &result {
          Ok(data) => match serde_json::to_value(data) {
            Ok(value) => cache.store(key, flight, value),
            Err(_) => cache.finish(key, flight),
          },
          Err(_) => cache.finish(key, flight),
        }
      }
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

// Query is not Clone because the fetcher is boxed and receiver is owned.
// If you need to share a query, wrap it in Arc<Mutex<Query<T>>>.

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("fetched_at", &self.fetched_at)
      .field("stale_time", &self.stale_time)
      .field("shared_wait", &self.shared_wait)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });

    assert!(matches!(query.state(), QueryState::Idle));

    query.fetch();
    assert!(query.is_loading());

    // Wait for the result
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(query.is_success());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err("Something went wrong".to_string()) });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(query.is_error());
    assert_eq!(query.error(), Some("Something went wrong"));
  }

  #[tokio::test]
  async fn test_query_stale() {
    let mut query = Query::new(|| async { Ok::<_, String>(42) }).with_stale_time(Duration::ZERO);

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;
    query.poll();

    // With zero stale time, should immediately be stale
    assert!(query.is_stale());
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let mut query = Query::new(|| async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      Ok::<_, String>(42)
    });

    query.fetch();
    assert!(query.is_loading());

    // Second fetch should be no-op
    query.fetch();
    assert!(query.is_loading());
  }

  #[tokio::test]
  async fn test_refetch_cancels_pending() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut query = Query::new(move || {
      let counter = counter_clone.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(counter.fetch_add(1, Ordering::SeqCst))
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Refetch should cancel the first and start a new one
    query.refetch();
    tokio::time::sleep(Duration::from_millis(100)).await;

    query.poll();
    // Only the second fetch should have completed and been received
    assert_eq!(query.data(), Some(&1));
  }

  fn counting_query(
    cache: &QueryCache,
    counter: &Arc<AtomicU32>,
    delay: Duration,
  ) -> Query<Vec<i32>> {
    let counter = counter.clone();
    Query::keyed(QueryKey::new("numbers"), cache.clone(), move || {
      let counter = counter.clone();
      async move {
        tokio::time::sleep(delay).await;
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![1, 2, 3])
      }
    })
  }

  #[tokio::test]
  async fn test_keyed_fetch_serves_cache_hit_synchronously() {
    let cache = QueryCache::new();
    let counter = Arc::new(AtomicU32::new(0));

    let mut first = counting_query(&cache, &counter, Duration::ZERO);
    first.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(first.poll());
    assert!(first.is_success());

    let mut second = counting_query(&cache, &counter, Duration::ZERO);
    second.fetch();
    // Resolved from the cache before any poll
    assert!(second.is_success());
    assert_eq!(second.data(), Some(&vec![1, 2, 3]));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_concurrent_keyed_fetches_share_one_flight() {
    let cache = QueryCache::new();
    let counter = Arc::new(AtomicU32::new(0));

    let mut owner = counting_query(&cache, &counter, Duration::from_millis(20));
    let mut waiter = counting_query(&cache, &counter, Duration::from_millis(20));

    owner.fetch();
    waiter.fetch();
    assert!(owner.is_loading());
    assert!(waiter.is_loading());

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(owner.poll());
    assert!(waiter.poll());
    assert_eq!(owner.data(), Some(&vec![1, 2, 3]));
    assert_eq!(waiter.data(), Some(&vec![1, 2, 3]));
    // The waiter adopted the owner's result instead of fetching again
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_waiter_takes_over_when_owner_fails() {
    let cache = QueryCache::new();
    let attempts = Arc::new(AtomicU32::new(0));
    let make = |attempts: &Arc<AtomicU32>| {
      let attempts = attempts.clone();
      Query::keyed(QueryKey::new("numbers"), cache.clone(), move || {
        let attempts = attempts.clone();
        async move {
          let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
          tokio::time::sleep(Duration::from_millis(10)).await;
          if attempt == 1 {
            Err("boom".to_string())
          } else {
            Ok(vec![5])
          }
        }
      })
    };

    let mut owner = make(&attempts);
    let mut waiter = make(&attempts);
    owner.fetch();
    waiter.fetch();

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(owner.poll());
    assert!(owner.is_error());

    // The waiter notices the key is free and runs its own fetch
    assert!(!waiter.poll());
    assert!(waiter.is_loading());
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(waiter.poll());
    assert_eq!(waiter.data(), Some(&vec![5]));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_invalidation_refetches_on_tick() {
    let cache = QueryCache::new();
    let counter = Arc::new(AtomicU32::new(0));

    let mut query = counting_query(&cache, &counter, Duration::ZERO);
    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(query.tick());
    assert!(query.is_success());

    assert_eq!(cache.invalidate("numbers"), 1);
    assert!(query.tick());
    assert!(query.is_loading());

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(query.tick());
    assert!(query.is_success());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_invalidation_during_first_fetch_refetches() {
    let cache = QueryCache::new();
    let counter = Arc::new(AtomicU32::new(0));

    let mut query = counting_query(&cache, &counter, Duration::from_millis(20));
    query.fetch();
    assert!(query.is_loading());

    // The mutation lands before the first result does
    cache.invalidate("numbers");

    tokio::time::sleep(Duration::from_millis(60)).await;
    // The disowned result settles, and the same tick starts the refetch
    assert!(query.tick());
    assert!(query.is_loading());

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(query.tick());
    assert!(query.is_success());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
  }
}
