//! Records returned by the marketplace backend.
//!
//! Field names mirror the wire format except where the backend spells a field
//! oddly (`discription`, `mounth`, `areaya`, `createBy`); those are renamed
//! here once so the rest of the crate uses the conventional spelling. Fields
//! the backend omits depending on record state are `Option` or defaulted,
//! never assumed present.

use serde::{Deserialize, Serialize};

/// Role strings as the backend stores them.
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_AGENT: &str = "AGENT";
pub const ROLE_USER: &str = "USER";

// ============================================================================
// Accounts
// ============================================================================

/// Account record from `user/all-user` and `user/:id`.
///
/// `agent_approved` is three-valued: approved, rejected, or never reviewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  #[serde(rename = "_id")]
  pub id: String,
  pub full_name: String,
  pub email: String,
  pub role: String,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub profile_image: Option<String>,
  #[serde(default)]
  pub verified: Option<bool>,
  #[serde(default)]
  pub agent_approved: Option<bool>,
  #[serde(default)]
  pub created_at: Option<String>,
  #[serde(default)]
  pub updated_at: Option<String>,
}

/// The signed-in admin's own record from `user/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  #[serde(rename = "_id")]
  pub id: String,
  pub full_name: String,
  pub email: String,
  #[serde(default)]
  pub username: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub bio: Option<String>,
  #[serde(default)]
  pub profile_image: Option<String>,
}

/// Body for `PUT user/profile`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
  pub full_name: String,
  pub email: String,
  pub username: String,
  pub phone: String,
  pub bio: String,
}

/// Payload of a successful `auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
  pub access_token: String,
  #[serde(default)]
  pub refresh_token: Option<String>,
  pub user: User,
}

// ============================================================================
// Dashboard
// ============================================================================

/// Headline counters from `dashboard/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
  #[serde(default)]
  pub total_user: u64,
  #[serde(default)]
  pub total_active_property: u64,
  #[serde(default)]
  pub subscription_data: u64,
  #[serde(default)]
  pub total_listing: u64,
  #[serde(default)]
  pub total_revenue: f64,
}

/// One bar of the earnings chart from `dashboard/monthly-earnings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthEarning {
  pub month: String,
  #[serde(default)]
  pub total_earnings: f64,
}

// ============================================================================
// Payments
// ============================================================================

/// Payer identity embedded in a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payer {
  #[serde(rename = "_id")]
  pub id: String,
  pub full_name: String,
  pub email: String,
  #[serde(default)]
  pub profile_image: Option<String>,
}

/// Plan summary embedded in a transaction. `subscription` can be absent when
/// the plan was deleted after the purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRef {
  #[serde(rename = "_id")]
  pub id: String,
  pub name: String,
  #[serde(rename = "discription", default)]
  pub description: String,
  #[serde(default)]
  pub amount: f64,
  #[serde(rename = "type", default)]
  pub kind: String,
}

/// Payment record from `payment/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
  #[serde(rename = "_id")]
  pub id: String,
  pub user: Payer,
  #[serde(default)]
  pub subscription: Option<PlanRef>,
  #[serde(default)]
  pub stripe_session_id: Option<String>,
  pub amount: f64,
  #[serde(default)]
  pub currency: String,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub created_at: Option<String>,
}

// ============================================================================
// Subscription plans
// ============================================================================

/// Plan record from `subscription`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
  #[serde(rename = "_id")]
  pub id: String,
  pub name: String,
  #[serde(rename = "discription", default)]
  pub description: String,
  #[serde(default)]
  pub amount: f64,
  #[serde(rename = "type", default)]
  pub kind: String,
  #[serde(default)]
  pub status: String,
}

impl Plan {
  pub fn is_active(&self) -> bool {
    self.status == "active"
  }
}

/// Body for `POST subscription` and `PUT subscription/:id`. The backend
/// accepts `description` here even though it stores `discription`.
#[derive(Debug, Clone, Serialize)]
pub struct PlanDraft {
  pub name: String,
  pub amount: f64,
  #[serde(rename = "type")]
  pub kind: String,
  pub description: String,
}

// ============================================================================
// Listings
// ============================================================================

/// Property category attached to a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingType {
  #[serde(rename = "_id")]
  pub id: String,
  pub name: String,
}

/// The agent who owns a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingProvider {
  pub full_name: String,
  pub email: String,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub profile_image: Option<String>,
  #[serde(default)]
  pub role: Option<String>,
}

/// GeoJSON-style point. `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
  #[serde(rename = "type", default)]
  pub kind: String,
  #[serde(default)]
  pub coordinates: Vec<f64>,
}

impl GeoPoint {
  pub fn longitude(&self) -> Option<f64> {
    (self.coordinates.len() == 2).then(|| self.coordinates[0])
  }

  pub fn latitude(&self) -> Option<f64> {
    (self.coordinates.len() == 2).then(|| self.coordinates[1])
  }
}

/// Listing record from `listing/` and `listing/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
  #[serde(rename = "_id")]
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub price: f64,
  #[serde(default)]
  pub address: String,
  #[serde(default)]
  pub size: String,
  #[serde(default)]
  pub city: String,
  #[serde(default)]
  pub country: String,
  #[serde(rename = "mounth", default)]
  pub month: String,
  #[serde(rename = "areaya", default)]
  pub area: String,
  #[serde(rename = "type", default)]
  pub category: Option<ListingType>,
  #[serde(rename = "user", default)]
  pub provider: Option<ListingProvider>,
  #[serde(rename = "extraLocation", default)]
  pub location: Option<GeoPoint>,
}

// ============================================================================
// Property types
// ============================================================================

/// Category record from `propertytype`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyType {
  #[serde(rename = "_id")]
  pub id: String,
  pub name: String,
  #[serde(rename = "createBy", default)]
  pub created_by: Option<String>,
  #[serde(default)]
  pub created_at: Option<String>,
  #[serde(default)]
  pub updated_at: Option<String>,
}

// ============================================================================
// Collections
// ============================================================================

/// One page of a server-paginated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: u64,
  pub page: u64,
  pub limit: u64,
}

impl<T> Page<T> {
  /// Number of pages the full collection spans. Zero for an empty collection.
  pub fn total_pages(&self) -> u64 {
    if self.limit == 0 {
      return 0;
    }
    self.total.div_ceil(self.limit)
  }
}

/// Parameters accepted by the paginated collection endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
  /// Committed search term; `None` sends no `searchTerm` at all.
  pub search: Option<String>,
  /// Extra filters like `role=AGENT`, in a fixed order.
  pub filters: Vec<(&'static str, String)>,
  pub page: u64,
  pub limit: u64,
}

impl Default for ListParams {
  fn default() -> Self {
    Self {
      search: None,
      filters: Vec::new(),
      page: 1,
      limit: 10,
    }
  }
}

impl ListParams {
  /// Query-string pairs in canonical order: search, filters, page, limit.
  pub fn to_query(&self) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::with_capacity(self.filters.len() + 3);
    if let Some(term) = &self.search {
      if !term.is_empty() {
        pairs.push(("searchTerm", term.clone()));
      }
    }
    pairs.extend(self.filters.iter().cloned());
    pairs.push(("page", self.page.to_string()));
    pairs.push(("limit", self.limit.to_string()));
    pairs
  }
}
