//! Cache identity for queries.

/// Identifies one cache slot: an endpoint plus its parameters in a fixed
/// order. Two keys built from the same endpoint and the same parameter
/// sequence are the same slot; parameter order is part of the identity, so
/// builders must emit it canonically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
  endpoint: String,
  params: Vec<(String, String)>,
}

impl QueryKey {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self {
      endpoint: endpoint.into(),
      params: Vec::new(),
    }
  }

  pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.params.push((name.into(), value.into()));
    self
  }

  /// The key in `endpoint?a=1&b=2` form, for logs and tests.
  pub fn render(&self) -> String {
    if self.params.is_empty() {
      return self.endpoint.clone();
    }
    let query: Vec<String> = self
      .params
      .iter()
      .map(|(name, value)| format!("{name}={value}"))
      .collect();
    format!("{}?{}", self.endpoint, query.join("&"))
  }

  /// Whether this key belongs to the collection named by `prefix`.
  ///
  /// Matching is segment-aware: `user` covers `user/all-user` and `user/u1`
  /// but not `userx`. Parameters never participate; invalidating a
  /// collection drops every page and filtering of it.
  pub fn matches_prefix(&self, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
      return true;
    }
    let endpoint = self.endpoint.trim_end_matches('/');
    if !endpoint.starts_with(prefix) {
      return false;
    }
    endpoint.len() == prefix.len() || endpoint.as_bytes()[prefix.len()] == b'/'
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_render_keeps_param_order() {
    let key = QueryKey::new("user/all-user")
      .param("searchTerm", "Olivia")
      .param("page", "1")
      .param("limit", "10");
    assert_eq!(key.render(), "user/all-user?searchTerm=Olivia&page=1&limit=10");
  }

  #[test]
  fn test_render_without_params() {
    assert_eq!(QueryKey::new("dashboard/").render(), "dashboard/");
  }

  #[test]
  fn test_prefix_match_is_segment_aware() {
    let list = QueryKey::new("user/all-user").param("page", "1");
    let detail = QueryKey::new("user/u1");
    let other = QueryKey::new("userx/all");

    assert!(list.matches_prefix("user"));
    assert!(detail.matches_prefix("user"));
    assert!(!other.matches_prefix("user"));
  }

  #[test]
  fn test_prefix_match_ignores_trailing_slash() {
    let key = QueryKey::new("dashboard/");
    assert!(key.matches_prefix("dashboard"));
    assert!(key.matches_prefix("dashboard/"));
  }

  #[test]
  fn test_exact_endpoint_matches_itself() {
    let key = QueryKey::new("propertytype").param("page", "2");
    assert!(key.matches_prefix("propertytype"));
    assert!(!key.matches_prefix("propertytype/pt1"));
  }

  #[test]
  fn test_param_order_is_identity() {
    let a = QueryKey::new("listing/").param("page", "1").param("limit", "10");
    let b = QueryKey::new("listing/").param("limit", "10").param("page", "1");
    assert_ne!(a, b);
  }
}
