//! Paginated collection driver for list views.
//!
//! Wraps a keyed [`Query`] and owns the request parameters: a debounced
//! search term, immediate filters, and a clamped page number. Every
//! parameter change swaps in a new query under the new cache key, so a
//! result still in the air for the old parameters can never be rendered as
//! the new ones. The views stay dumb: keys in, rows out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::types::{ListParams, Page};
use crate::query::{BoxFuture, Query, QueryCache, QueryKey, QueryState};

type PageFetcher<T> = Arc<dyn Fn(ListParams) -> BoxFuture<Page<T>> + Send + Sync>;

pub struct CollectionQuery<T> {
  endpoint: &'static str,
  fetcher: PageFetcher<T>,
  cache: QueryCache,
  query: Query<Page<T>>,
  params: ListParams,
  /// Search text as typed; moves into `params.search` when the debounce
  /// window closes or the operator submits.
  pending_search: String,
  debounce: Duration,
  deadline: Option<tokio::time::Instant>,
  enabled: bool,
}

impl<T> CollectionQuery<T>
where
  T: Serialize + DeserializeOwned + Send + 'static,
{
  pub fn new<F, Fut>(
    endpoint: &'static str,
    cache: QueryCache,
    debounce: Duration,
    fetcher: F,
  ) -> Self
  where
    F: Fn(ListParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page<T>, String>> + Send + 'static,
  {
    let fetcher: PageFetcher<T> = Arc::new(move |params| Box::pin(fetcher(params)));
    let params = ListParams::default();
    let key = Self::render_key(endpoint, &params);
    let query = Self::build_query(key, &fetcher, &cache, &params);
    Self {
      endpoint,
      fetcher,
      cache,
      query,
      params,
      pending_search: String::new(),
      debounce,
      deadline: None,
      enabled: true,
    }
  }

  pub fn with_page_size(mut self, limit: u64) -> Self {
    self.params.limit = limit;
    self
  }

  /// Pin a filter before the first fetch, like the agent view's fixed role.
  pub fn with_filter(mut self, name: &'static str, value: impl Into<String>) -> Self {
    self.params.filters.push((name, value.into()));
    self
  }

  #[allow(dead_code)]
  pub fn enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }

  /// Issue the first fetch. Call once the builder chain is done.
  pub fn start(&mut self) {
    self.requery();
  }

  // ==========================================================================
  // Search
  // ==========================================================================

  /// Record a keystroke. The fetch waits out the debounce window, and every
  /// further keystroke rearms it.
  pub fn set_search(&mut self, text: String) {
    self.pending_search = text;
    self.deadline = Some(tokio::time::Instant::now() + self.debounce);
  }

  /// Commit the pending search immediately, skipping the rest of the window.
  pub fn commit_search(&mut self) {
    self.deadline = None;
    self.commit_pending();
  }

  pub fn search(&self) -> &str {
    self.params.search.as_deref().unwrap_or("")
  }

  // ==========================================================================
  // Filters
  // ==========================================================================

  /// Replace (or with `None`, drop) a filter. Takes effect immediately and
  /// jumps back to the first page; the search term is kept.
  pub fn set_filter(&mut self, name: &'static str, value: Option<String>) {
    self.params.filters.retain(|(n, _)| *n != name);
    if let Some(value) = value {
      self.params.filters.push((name, value));
    }
    self.params.page = 1;
    self.requery();
  }

  pub fn filter(&self, name: &str) -> Option<&str> {
    self
      .params
      .filters
      .iter()
      .find(|(n, _)| *n == name)
      .map(|(_, v)| v.as_str())
  }

  // ==========================================================================
  // Pagination
  // ==========================================================================

  pub fn page(&self) -> u64 {
    self.params.page
  }

  pub fn total_pages(&self) -> u64 {
    self.query.data().map(|page| page.total_pages()).unwrap_or(0)
  }

  pub fn total(&self) -> u64 {
    self.query.data().map(|page| page.total).unwrap_or(0)
  }

  /// Paging is only offered over loaded data, so the ends stay disabled
  /// while a fetch is out and no out-of-range request can be issued.
  pub fn can_next(&self) -> bool {
    match self.query.data() {
      Some(data) => self.params.page < data.total_pages(),
      None => false,
    }
  }

  pub fn can_prev(&self) -> bool {
    self.query.data().is_some() && self.params.page > 1
  }

  pub fn next_page(&mut self) {
    if self.can_next() {
      self.params.page += 1;
      self.requery();
    }
  }

  pub fn prev_page(&mut self) {
    if self.can_prev() {
      self.params.page -= 1;
      self.requery();
    }
  }

  // ==========================================================================
  // Lifecycle
  // ==========================================================================

  /// Drive the debounce clock and the underlying query. Clamps the page
  /// number when a fetch reveals the collection shrank under it. Returns
  /// `true` when the rendered state changed.
  pub fn tick(&mut self) -> bool {
    let mut changed = false;
    if let Some(deadline) = self.deadline {
      if tokio::time::Instant::now() >= deadline {
        self.deadline = None;
        changed |= self.commit_pending();
      }
    }

    changed |= self.query.tick();

    let clamp_to = self.query.data().and_then(|data| {
      let last = data.total_pages().max(1);
      (self.params.page > last).then_some(last)
    });
    if let Some(last) = clamp_to {
      self.params.page = last;
      self.requery();
      changed = true;
    }

    changed
  }

  /// Force a refetch of the current page.
  pub fn refresh(&mut self) {
    if self.enabled {
      self.query.refetch();
    }
  }

  /// Gate fetching. Enabling fires the fetch the gate was holding back.
  #[allow(dead_code)]
  pub fn set_enabled(&mut self, enabled: bool) {
    let was = self.enabled;
    self.enabled = enabled;
    if enabled && !was && matches!(self.query.state(), QueryState::Idle) {
      self.query.fetch();
    }
  }

  pub fn state(&self) -> &QueryState<Page<T>> {
    self.query.state()
  }

  pub fn data(&self) -> Option<&Page<T>> {
    self.query.data()
  }

  pub fn items(&self) -> &[T] {
    self.data().map(|page| page.items.as_slice()).unwrap_or(&[])
  }

  pub fn is_loading(&self) -> bool {
    self.query.is_loading()
  }

  pub fn error(&self) -> Option<&str> {
    self.query.error()
  }

  /// Cache key for the current parameters.
  pub fn key(&self) -> QueryKey {
    Self::render_key(self.endpoint, &self.params)
  }

  fn commit_pending(&mut self) -> bool {
    if self.pending_search == self.search() {
      return false;
    }
    self.params.search = if self.pending_search.is_empty() {
      None
    } else {
      Some(self.pending_search.clone())
    };
    self.params.page = 1;
    self.requery();
    true
  }

  /// Swap in a query for the current parameters. Dropping the old query
  /// abandons its receiver, so a late result for the old key only ever
  /// settles in the cache.
  fn requery(&mut self) {
    self.query = Self::build_query(self.key(), &self.fetcher, &self.cache, &self.params);
    if self.enabled {
      self.query.fetch();
    }
  }

  fn build_query(
    key: QueryKey,
    fetcher: &PageFetcher<T>,
    cache: &QueryCache,
    params: &ListParams,
  ) -> Query<Page<T>> {
    let fetcher = fetcher.clone();
    let params = params.clone();
    Query::keyed(key, cache.clone(), move || fetcher(params.clone()))
  }

  fn render_key(endpoint: &str, params: &ListParams) -> QueryKey {
    let mut key = QueryKey::new(endpoint);
    for (name, value) in params.to_query() {
      key = key.param(name, value);
    }
    key
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
  use std::sync::Arc;

  struct Fixture {
    collection: CollectionQuery<u32>,
    calls: Arc<AtomicU32>,
    total: Arc<AtomicU64>,
  }

  fn fixture(endpoint: &'static str, cache: &QueryCache) -> Fixture {
    let calls = Arc::new(AtomicU32::new(0));
    let total = Arc::new(AtomicU64::new(30));
    let calls_inner = calls.clone();
    let total_inner = total.clone();
    let collection = CollectionQuery::new(
      endpoint,
      cache.clone(),
      Duration::from_millis(500),
      move |params: ListParams| {
        let calls = calls_inner.clone();
        let total = total_inner.clone();
        async move {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok(Page {
            items: vec![params.page as u32],
            total: total.load(Ordering::SeqCst),
            page: params.page,
            limit: params.limit,
          })
        }
      },
    );
    Fixture {
      collection,
      calls,
      total,
    }
  }

  async fn settle(collection: &mut CollectionQuery<u32>) {
    // Let the spawned fetch run and deliver under paused time.
    tokio::time::advance(Duration::from_millis(1)).await;
    collection.tick();
  }

  #[tokio::test(start_paused = true)]
  async fn test_search_waits_for_debounce_and_fires_once() {
    let cache = QueryCache::new();
    let mut fx = fixture("user/all-user", &cache);
    fx.collection.start();
    settle(&mut fx.collection).await;
    assert_eq!(fx.calls.load(Ordering::SeqCst), 1);

    // A burst of keystrokes, each inside the previous window
    for text in ["O", "Ol", "Olivia"] {
      fx.collection.set_search(text.to_string());
      tokio::time::advance(Duration::from_millis(200)).await;
      fx.collection.tick();
    }
    // Only 200ms since the last keystroke; still waiting
    assert_eq!(fx.calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_millis(301)).await;
    fx.collection.tick();
    settle(&mut fx.collection).await;

    // One fetch for the final term, back on the first page
    assert_eq!(fx.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
      fx.collection.key().render(),
      "user/all-user?searchTerm=Olivia&page=1&limit=10"
    );
    assert_eq!(fx.collection.search(), "Olivia");
  }

  #[tokio::test(start_paused = true)]
  async fn test_submit_skips_remaining_debounce() {
    let cache = QueryCache::new();
    let mut fx = fixture("user/all-user", &cache);
    fx.collection.start();
    settle(&mut fx.collection).await;

    fx.collection.set_search("Liam".to_string());
    fx.collection.commit_search();
    settle(&mut fx.collection).await;

    assert_eq!(fx.calls.load(Ordering::SeqCst), 2);
    assert_eq!(fx.collection.search(), "Liam");
  }

  #[tokio::test(start_paused = true)]
  async fn test_filter_applies_immediately_and_resets_page() {
    let cache = QueryCache::new();
    let mut fx = fixture("user/all-user", &cache);
    fx.collection.start();
    settle(&mut fx.collection).await;

    fx.collection.next_page();
    settle(&mut fx.collection).await;
    assert_eq!(fx.collection.page(), 2);

    fx.collection.set_filter("agentApproved", Some("true".to_string()));
    assert_eq!(fx.collection.page(), 1);
    settle(&mut fx.collection).await;
    assert_eq!(
      fx.collection.key().render(),
      "user/all-user?agentApproved=true&page=1&limit=10"
    );
    assert_eq!(fx.calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn test_paging_disabled_at_the_ends() {
    let cache = QueryCache::new();
    let mut fx = fixture("listing/", &cache);
    // Nothing loaded yet; both directions held
    assert!(!fx.collection.can_prev());
    assert!(!fx.collection.can_next());

    fx.collection.start();
    settle(&mut fx.collection).await;
    assert!(!fx.collection.can_prev());
    assert!(fx.collection.can_next());

    fx.collection.next_page();
    settle(&mut fx.collection).await;
    fx.collection.next_page();
    settle(&mut fx.collection).await;
    assert_eq!(fx.collection.page(), 3);
    assert!(!fx.collection.can_next());

    // Out of range; no request leaves
    let before = fx.calls.load(Ordering::SeqCst);
    fx.collection.next_page();
    assert_eq!(fx.collection.page(), 3);
    assert_eq!(fx.calls.load(Ordering::SeqCst), before);
  }

  #[tokio::test(start_paused = true)]
  async fn test_shrunk_collection_clamps_page() {
    let cache = QueryCache::new();
    let mut fx = fixture("propertytype", &cache);
    fx.collection.start();
    settle(&mut fx.collection).await;
    fx.collection.next_page();
    settle(&mut fx.collection).await;
    fx.collection.next_page();
    settle(&mut fx.collection).await;
    assert_eq!(fx.collection.page(), 3);

    // A delete elsewhere shrinks the collection to two pages
    fx.total.store(20, Ordering::SeqCst);
    cache.invalidate("propertytype");

    fx.collection.tick(); // stale noticed, refetch starts
    settle(&mut fx.collection).await; // page 3 comes back empty of pages
    settle(&mut fx.collection).await; // clamped refetch of page 2 lands

    assert_eq!(fx.collection.page(), 2);
    assert_eq!(fx.collection.total_pages(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_disabled_collection_issues_no_fetch() {
    let cache = QueryCache::new();
    let calls = Arc::new(AtomicU32::new(0));
    let calls_inner = calls.clone();
    let mut collection: CollectionQuery<u32> = CollectionQuery::new(
      "subscription",
      cache.clone(),
      Duration::from_millis(500),
      move |params: ListParams| {
        let calls = calls_inner.clone();
        async move {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok(Page {
            items: vec![],
            total: 0,
            page: params.page,
            limit: params.limit,
          })
        }
      },
    )
    .enabled(false);

    collection.start();
    tokio::time::advance(Duration::from_millis(50)).await;
    collection.tick();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    collection.set_enabled(true);
    tokio::time::advance(Duration::from_millis(1)).await;
    collection.tick();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_superseded_result_never_renders() {
    let cache = QueryCache::new();
    let calls = Arc::new(AtomicU32::new(0));
    let calls_inner = calls.clone();
    // Slow fetcher; totals differ by term so the rendered page betrays its
    // origin.
    let mut collection: CollectionQuery<u32> = CollectionQuery::new(
      "listing/",
      cache.clone(),
      Duration::from_millis(500),
      move |params: ListParams| {
        let calls = calls_inner.clone();
        async move {
          calls.fetch_add(1, Ordering::SeqCst);
          tokio::time::sleep(Duration::from_millis(50)).await;
          let total = if params.search.is_some() { 1 } else { 99 };
          Ok(Page {
            items: vec![],
            total,
            page: params.page,
            limit: params.limit,
          })
        }
      },
    );

    collection.start();
    // Re-key while the first fetch is still in the air
    collection.set_search("studio".to_string());
    collection.commit_search();

    tokio::time::advance(Duration::from_millis(200)).await;
    collection.tick();

    // Only the result for the current key is rendered
    assert_eq!(collection.total(), 1);
    assert_eq!(fxless_total(&cache), Some(99));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  /// The superseded fetch still settles in the cache under its own key.
  fn fxless_total(cache: &QueryCache) -> Option<u64> {
    let old_key = QueryKey::new("listing/")
      .param("page", "1")
      .param("limit", "10");
    let value = cache.fresh(&old_key)?;
    value.get("total").and_then(|t| t.as_u64())
  }
}
