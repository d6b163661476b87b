//! The backend's response envelope.
//!
//! Every endpoint wraps its payload the same way: `{ statusCode, success,
//! message, meta?, data }`. Which fields actually show up varies by endpoint
//! and by error path, so everything here is optional and the accessors pick
//! sensible fallbacks. `statusCode` duplicates the HTTP status and is not
//! decoded.

use serde::Deserialize;
use serde_json::Value;

use super::error::ApiError;
use super::types::{ListParams, Page};

/// Pagination block some collection endpoints attach next to `data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
  #[serde(default)]
  pub total: Option<u64>,
  #[serde(default)]
  pub page: Option<u64>,
  #[serde(default)]
  pub limit: Option<u64>,
}

/// Top-level response shape shared by all endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
  #[serde(default)]
  pub success: Option<bool>,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub meta: Option<Meta>,
  #[serde(default)]
  pub data: Value,
}

impl Envelope {
  /// An absent `success` on a 2xx response still counts as success; only an
  /// explicit `false` marks a failure the transport layer did not catch.
  pub fn is_success(&self) -> bool {
    self.success.unwrap_or(true)
  }

  /// The server's own message, or `default` when it sent none.
  pub fn message_or(&self, default: &str) -> String {
    match &self.message {
      Some(msg) if !msg.is_empty() => msg.clone(),
      _ => default.to_string(),
    }
  }

  /// Decode `data` into a concrete record.
  pub fn decode<T: serde::de::DeserializeOwned>(self) -> Result<T, ApiError> {
    Ok(serde_json::from_value(self.data)?)
  }

  /// Decode `data` as one page of a collection.
  ///
  /// When the endpoint sends no `meta`, the response is treated as the whole
  /// collection on page one. The fallback limit never reports fewer slots
  /// than items actually present.
  pub fn decode_page<T: serde::de::DeserializeOwned>(
    self,
    requested: &ListParams,
  ) -> Result<Page<T>, ApiError> {
    let meta = self.meta.clone().unwrap_or_default();
    let items: Vec<T> = serde_json::from_value(self.data)?;
    let len = items.len() as u64;
    Ok(Page {
      total: meta.total.unwrap_or(len),
      page: meta.page.unwrap_or(1),
      limit: meta.limit.unwrap_or_else(|| requested.limit.max(len)),
      items,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::PropertyType;

  #[test]
  fn test_decode_page_with_meta() {
    let envelope: Envelope = serde_json::from_value(serde_json::json!({
      "statusCode": 200,
      "success": true,
      "message": "Property types retrieved successfully",
      "meta": { "total": 15, "page": 2, "limit": 10 },
      "data": [
        { "_id": "pt1", "name": "Apartment" },
        { "_id": "pt2", "name": "Villa" }
      ]
    }))
    .unwrap();

    let page: Page<PropertyType> = envelope.decode_page(&ListParams::default()).unwrap();
    assert_eq!(page.total, 15);
    assert_eq!(page.page, 2);
    assert_eq!(page.limit, 10);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages(), 2);
  }

  #[test]
  fn test_decode_page_without_meta_is_single_page() {
    let envelope: Envelope = serde_json::from_value(serde_json::json!({
      "success": true,
      "data": [
        { "_id": "pt1", "name": "Apartment" },
        { "_id": "pt2", "name": "Villa" },
        { "_id": "pt3", "name": "Office" }
      ]
    }))
    .unwrap();

    let requested = ListParams {
      limit: 2,
      ..Default::default()
    };
    let page: Page<PropertyType> = envelope.decode_page(&requested).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.page, 1);
    // Limit widens so the page never claims fewer slots than items it holds.
    assert_eq!(page.limit, 3);
    assert_eq!(page.total_pages(), 1);
  }

  #[test]
  fn test_explicit_failure_flag() {
    let envelope: Envelope = serde_json::from_value(serde_json::json!({
      "success": false,
      "message": "Something went wrong"
    }))
    .unwrap();
    assert!(!envelope.is_success());
    assert_eq!(envelope.message_or("request failed"), "Something went wrong");
  }

  #[test]
  fn test_absent_success_counts_as_success() {
    let envelope: Envelope =
      serde_json::from_value(serde_json::json!({ "data": {} })).unwrap();
    assert!(envelope.is_success());
  }

  #[test]
  fn test_message_fallback_on_empty() {
    let envelope: Envelope =
      serde_json::from_value(serde_json::json!({ "message": "" })).unwrap();
    assert_eq!(envelope.message_or("request failed"), "request failed");
  }
}
