//! Shared handles every view gets.

use std::time::Duration;

use crate::api::ApiClient;
use crate::notify::Notifier;
use crate::query::QueryCache;
use crate::session::SessionStore;

/// One bundle of the app-wide services. Cloning is cheap; all handles alias
/// the same underlying state.
#[derive(Clone)]
pub struct Ctx {
  pub api: ApiClient,
  pub cache: QueryCache,
  pub notifier: Notifier,
  pub session: SessionStore,
  /// Rows per page in list views.
  pub page_size: u64,
  /// Quiet period before a search keystroke becomes a query.
  pub debounce: Duration,
  /// Year the earnings chart opens on; `None` means the newest.
  pub earnings_year: Option<String>,
}
