//! Shared response cache with single-flight bookkeeping.
//!
//! Slots hold raw JSON so one cache serves every payload type. A fetch first
//! claims its key; while the claim is held, other queries for the same key
//! wait and adopt the stored result instead of issuing their own request.
//! Claims carry a generation so a superseded fetch that lands late cannot
//! overwrite newer data.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;

use super::key::QueryKey;

const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Proof of an in-flight claim. Only the holder of the current generation
/// may store or release the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flight(u64);

#[derive(Debug, Clone)]
struct Slot {
  value: Value,
  stored_at: Instant,
  stale: bool,
}

#[derive(Default)]
struct Inner {
  slots: HashMap<QueryKey, Slot>,
  in_flight: HashMap<QueryKey, u64>,
  next_generation: u64,
}

/// Shared cache handle. `Clone` aliases the same storage.
#[derive(Clone)]
pub struct QueryCache {
  inner: Arc<Mutex<Inner>>,
  ttl: Duration,
}

impl Default for QueryCache {
  fn default() -> Self {
    Self::with_ttl(DEFAULT_TTL)
  }
}

impl QueryCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_ttl(ttl: Duration) -> Self {
    Self {
      inner: Arc::new(Mutex::new(Inner::default())),
      ttl,
    }
  }

  /// Claim `key` for a fetch. Returns `None` when another fetch already
  /// holds it, in which case the caller should wait and adopt.
  pub fn begin(&self, key: &QueryKey) -> Option<Flight> {
    let mut inner = self.lock();
    if inner.in_flight.contains_key(key) {
      return None;
    }
    let generation = inner.next_generation;
    inner.next_generation += 1;
    inner.in_flight.insert(key.clone(), generation);
    Some(Flight(generation))
  }

  /// Claim `key` unconditionally, superseding any fetch currently holding
  /// it. The superseded fetch's store becomes a no-op.
  pub fn reclaim(&self, key: &QueryKey) -> Flight {
    let mut inner = self.lock();
    let generation = inner.next_generation;
    inner.next_generation += 1;
    inner.in_flight.insert(key.clone(), generation);
    Flight(generation)
  }

  /// Store a result and release the claim. Ignored when `flight` is no
  /// longer the key's current claim.
  pub fn store(&self, key: &QueryKey, flight: Flight, value: Value) {
    let mut inner = self.lock();
    if inner.in_flight.get(key) != Some(&flight.0) {
      return;
    }
    inner.in_flight.remove(key);
    inner.slots.insert(
      key.clone(),
      Slot {
        value,
        stored_at: Instant::now(),
        stale: false,
      },
    );
  }

  /// Release the claim without storing, for the error path.
  pub fn finish(&self, key: &QueryKey, flight: Flight) {
    let mut inner = self.lock();
    if inner.in_flight.get(key) == Some(&flight.0) {
      inner.in_flight.remove(key);
    }
  }

  /// A usable value for `key`: present, within its lifetime, and not
  /// invalidated.
  pub fn fresh(&self, key: &QueryKey) -> Option<Value> {
    let inner = self.lock();
    let slot = inner.slots.get(key)?;
    if slot.stale || slot.stored_at.elapsed() >= self.ttl {
      return None;
    }
    Some(slot.value.clone())
  }

  pub fn is_in_flight(&self, key: &QueryKey) -> bool {
    self.lock().in_flight.contains_key(key)
  }

  /// Whether `key` holds data a mutation has since invalidated.
  pub fn is_stale(&self, key: &QueryKey) -> bool {
    self
      .lock()
      .slots
      .get(key)
      .map(|slot| slot.stale)
      .unwrap_or(false)
  }

  /// Mark every slot under `prefix` stale and disown matching in-flight
  /// fetches, so results requested before the mutation cannot repopulate the
  /// cache. A disowned key with nothing stored yet gets a stale placeholder;
  /// without one its owner would settle on the pre-mutation result and leave
  /// no marker to trigger the refetch. Returns how many slots were marked.
  pub fn invalidate(&self, prefix: &str) -> usize {
    let mut inner = self.lock();
    let mut marked = 0;
    for (key, slot) in inner.slots.iter_mut() {
      if key.matches_prefix(prefix) {
        slot.stale = true;
        marked += 1;
      }
    }
    let disowned: Vec<QueryKey> = inner
      .in_flight
      .keys()
      .filter(|key| key.matches_prefix(prefix))
      .cloned()
      .collect();
    for key in disowned {
      inner.in_flight.remove(&key);
      if !inner.slots.contains_key(&key) {
        inner.slots.insert(
          key,
          Slot {
            value: Value::Null,
            stored_at: Instant::now(),
            stale: true,
          },
        );
        marked += 1;
      }
    }
    marked
  }

  /// Drop everything, claims included. Used on logout.
  pub fn clear(&self) {
    let mut inner = self.lock();
    inner.slots.clear();
    inner.in_flight.clear();
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(endpoint: &str) -> QueryKey {
    QueryKey::new(endpoint)
  }

  #[test]
  fn test_second_claim_waits() {
    let cache = QueryCache::new();
    let k = key("payment/");
    let flight = cache.begin(&k).unwrap();
    assert!(cache.begin(&k).is_none());
    assert!(cache.is_in_flight(&k));

    cache.store(&k, flight, serde_json::json!([1, 2]));
    assert!(!cache.is_in_flight(&k));
    assert_eq!(cache.fresh(&k), Some(serde_json::json!([1, 2])));
  }

  #[test]
  fn test_superseded_store_is_dropped() {
    let cache = QueryCache::new();
    let k = key("dashboard/");
    let old = cache.begin(&k).unwrap();
    let new = cache.reclaim(&k);

    cache.store(&k, old, serde_json::json!({ "totalUser": 1 }));
    assert_eq!(cache.fresh(&k), None);

    cache.store(&k, new, serde_json::json!({ "totalUser": 2 }));
    assert_eq!(cache.fresh(&k), Some(serde_json::json!({ "totalUser": 2 })));
  }

  #[test]
  fn test_sibling_pages_keep_separate_slots() {
    let cache = QueryCache::new();
    let page1 = QueryKey::new("user/all-user").param("page", "1");
    let page2 = QueryKey::new("user/all-user").param("page", "2");

    let flight = cache.begin(&page1).unwrap();
    cache.store(&page1, flight, serde_json::json!(["ada"]));

    let flight = cache.begin(&page2).unwrap();
    cache.store(&page2, flight, serde_json::json!(["bea"]));

    assert_eq!(cache.fresh(&page1), Some(serde_json::json!(["ada"])));
    assert_eq!(cache.fresh(&page2), Some(serde_json::json!(["bea"])));
  }

  #[test]
  fn test_finish_releases_without_storing() {
    let cache = QueryCache::new();
    let k = key("subscription");
    let flight = cache.begin(&k).unwrap();
    cache.finish(&k, flight);
    assert!(!cache.is_in_flight(&k));
    assert_eq!(cache.fresh(&k), None);
  }

  #[test]
  fn test_invalidate_marks_collection_and_spares_others() {
    let cache = QueryCache::new();
    let page1 = QueryKey::new("user/all-user").param("page", "1");
    let page2 = QueryKey::new("user/all-user").param("page", "2");
    let dashboard = key("dashboard/");
    for k in [&page1, &page2, &dashboard] {
      let flight = cache.begin(k).unwrap();
      cache.store(k, flight, serde_json::json!(null));
    }

    assert_eq!(cache.invalidate("user"), 2);
    assert!(cache.is_stale(&page1));
    assert!(cache.is_stale(&page2));
    assert!(!cache.is_stale(&dashboard));
    assert_eq!(cache.fresh(&page1), None);
    assert!(cache.fresh(&dashboard).is_some());
  }

  #[test]
  fn test_invalidate_disowns_in_flight_fetch() {
    let cache = QueryCache::new();
    let k = QueryKey::new("propertytype").param("page", "1");
    let flight = cache.begin(&k).unwrap();

    cache.invalidate("propertytype");
    assert!(!cache.is_in_flight(&k));
    // A stale marker survives even though nothing was stored yet
    assert!(cache.is_stale(&k));

    // The pre-mutation result lands late and must not become fresh data.
    cache.store(&k, flight, serde_json::json!([{ "_id": "pt1" }]));
    assert_eq!(cache.fresh(&k), None);
    assert!(cache.is_stale(&k));
  }

  #[test]
  fn test_expired_slot_is_not_fresh() {
    let cache = QueryCache::with_ttl(Duration::ZERO);
    let k = key("listing/");
    let flight = cache.begin(&k).unwrap();
    cache.store(&k, flight, serde_json::json!([]));
    assert_eq!(cache.fresh(&k), None);
    // Expiry is not invalidation; nothing marked it stale.
    assert!(!cache.is_stale(&k));
  }

  #[test]
  fn test_clear_drops_slots_and_claims() {
    let cache = QueryCache::new();
    let k = key("payment/");
    let flight = cache.begin(&k).unwrap();
    cache.store(&k, flight, serde_json::json!([]));
    cache.begin(&key("dashboard/")).unwrap();

    cache.clear();
    assert_eq!(cache.fresh(&k), None);
    assert!(!cache.is_in_flight(&key("dashboard/")));
  }
}
