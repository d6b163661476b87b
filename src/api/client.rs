//! HTTP client for the marketplace backend.
//!
//! Every request goes through one dispatch path that attaches the JSON
//! headers and, for protected endpoints, the session's bearer token. A call
//! fires exactly once; retrying is left to the operator pressing `r`.

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use url::Url;

use super::error::ApiError;
use super::types::{
  Listing, ListParams, LoginData, MonthEarning, Overview, Page, Plan, PlanDraft, Profile,
  ProfileUpdate, PropertyType, Transaction, User,
};
use super::wire::Envelope;
use crate::session::SessionStore;

/// Whether a call sends the session's bearer token. Storefront endpoints are
/// readable without one.
#[derive(Clone, Copy)]
enum Auth {
  Bearer,
  Public,
}

/// Marketplace API client.
#[derive(Clone)]
pub struct ApiClient {
  http: Client,
  base: Url,
  session: SessionStore,
}

impl ApiClient {
  pub fn new(base_url: &str, session: SessionStore) -> Result<Self, ApiError> {
    // A base without a trailing slash would drop its last path segment on
    // every join.
    let mut base = base_url.to_string();
    if !base.ends_with('/') {
      base.push('/');
    }
    let base = Url::parse(&base)?;

    let http = Client::builder()
      .user_agent(concat!("p9s/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self {
      http,
      base,
      session,
    })
  }

  /// Issue a request and parse the response envelope, without judging the
  /// envelope's own success flag.
  async fn send(
    &self,
    method: Method,
    path: &str,
    query: &[(&'static str, String)],
    body: Option<Value>,
    auth: Auth,
  ) -> Result<(StatusCode, Envelope), ApiError> {
    let url = self.base.join(path)?;
    let mut request = self.http.request(method, url);

    if !query.is_empty() {
      request = request.query(query);
    }
    if let Auth::Bearer = auth {
      let token = self
        .session
        .token()
        .ok_or_else(|| ApiError::Auth("no active session".to_string()))?;
      request = request.bearer_auth(token);
    }
    if let Some(body) = body {
      request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let envelope: Envelope = match response.json().await {
      Ok(envelope) => envelope,
      Err(_) if !status.is_success() => {
        // Gateways answer some failures with bare text; derive a message
        // from the status line instead.
        return Err(ApiError::Request {
          status: status.as_u16(),
          message: format!("request failed with status {}", status.as_u16()),
        });
      }
      Err(err) => return Err(err.into()),
    };

    Ok((status, envelope))
  }

  /// `send` plus the standard failure mapping: a non-2xx status or an
  /// explicit `success: false` becomes a request error carrying the server's
  /// message.
  async fn call(
    &self,
    method: Method,
    path: &str,
    query: &[(&'static str, String)],
    body: Option<Value>,
    auth: Auth,
  ) -> Result<Envelope, ApiError> {
    let (status, envelope) = self.send(method, path, query, body, auth).await?;
    if !status.is_success() || !envelope.is_success() {
      return Err(ApiError::Request {
        status: status.as_u16(),
        message: envelope.message_or("request failed"),
      });
    }
    Ok(envelope)
  }

  // ==========================================================================
  // Auth
  // ==========================================================================

  /// Exchange credentials for a token bundle. Failures surface as auth
  /// errors so the login screen shows the server's reason directly.
  pub async fn login(&self, email: &str, password: &str) -> Result<LoginData, ApiError> {
    let body = serde_json::json!({ "email": email, "password": password });
    let (status, envelope) = self
      .send(Method::POST, "auth/login", &[], Some(body), Auth::Public)
      .await?;
    if !status.is_success() || !envelope.is_success() {
      return Err(ApiError::Auth(
        envelope.message_or("Invalid email or password"),
      ));
    }
    envelope.decode()
  }

  pub async fn change_password(&self, old: &str, new: &str) -> Result<(), ApiError> {
    let body = serde_json::json!({ "oldPassword": old, "newPassword": new });
    self
      .call(
        Method::POST,
        "auth/change-password",
        &[],
        Some(body),
        Auth::Bearer,
      )
      .await?;
    Ok(())
  }

  pub async fn profile(&self) -> Result<Profile, ApiError> {
    self
      .call(Method::GET, "user/profile", &[], None, Auth::Bearer)
      .await?
      .decode()
  }

  pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
    let body = serde_json::to_value(update)?;
    self
      .call(Method::PUT, "user/profile", &[], Some(body), Auth::Bearer)
      .await?;
    Ok(())
  }

  // ==========================================================================
  // Users and agents
  // ==========================================================================

  pub async fn users(&self, params: &ListParams) -> Result<Page<User>, ApiError> {
    self
      .call(
        Method::GET,
        "user/all-user",
        &params.to_query(),
        None,
        Auth::Bearer,
      )
      .await?
      .decode_page(params)
  }

  pub async fn user(&self, id: &str) -> Result<User, ApiError> {
    self
      .call(Method::GET, &format!("user/{id}"), &[], None, Auth::Bearer)
      .await?
      .decode()
  }

  pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
    self
      .call(
        Method::DELETE,
        &format!("user/{id}"),
        &[],
        None,
        Auth::Bearer,
      )
      .await?;
    Ok(())
  }

  pub async fn approve_agent(&self, id: &str) -> Result<(), ApiError> {
    self
      .call(
        Method::PUT,
        &format!("user/approved-agent/{id}"),
        &[],
        None,
        Auth::Bearer,
      )
      .await?;
    Ok(())
  }

  pub async fn reject_agent(&self, id: &str) -> Result<(), ApiError> {
    self
      .call(
        Method::PUT,
        &format!("user/reject-agent/{id}"),
        &[],
        None,
        Auth::Bearer,
      )
      .await?;
    Ok(())
  }

  // ==========================================================================
  // Dashboard
  // ==========================================================================

  pub async fn overview(&self) -> Result<Overview, ApiError> {
    self
      .call(Method::GET, "dashboard/", &[], None, Auth::Bearer)
      .await?
      .decode()
  }

  pub async fn monthly_earnings(&self, year: &str) -> Result<Vec<MonthEarning>, ApiError> {
    self
      .call(
        Method::GET,
        "dashboard/monthly-earnings",
        &[("year", year.to_string())],
        None,
        Auth::Bearer,
      )
      .await?
      .decode()
  }

  // ==========================================================================
  // Payments
  // ==========================================================================

  /// The payment endpoint has no pagination; it returns the full history.
  pub async fn transactions(&self) -> Result<Vec<Transaction>, ApiError> {
    self
      .call(Method::GET, "payment/", &[], None, Auth::Bearer)
      .await?
      .decode()
  }

  // ==========================================================================
  // Property types
  // ==========================================================================

  pub async fn property_types(&self, params: &ListParams) -> Result<Page<PropertyType>, ApiError> {
    self
      .call(
        Method::GET,
        "propertytype",
        &params.to_query(),
        None,
        Auth::Bearer,
      )
      .await?
      .decode_page(params)
  }

  pub async fn create_property_type(&self, name: &str) -> Result<(), ApiError> {
    let body = serde_json::json!({ "name": name });
    self
      .call(Method::POST, "propertytype", &[], Some(body), Auth::Bearer)
      .await?;
    Ok(())
  }

  pub async fn rename_property_type(&self, id: &str, name: &str) -> Result<(), ApiError> {
    let body = serde_json::json!({ "name": name });
    self
      .call(
        Method::PUT,
        &format!("propertytype/{id}"),
        &[],
        Some(body),
        Auth::Bearer,
      )
      .await?;
    Ok(())
  }

  pub async fn delete_property_type(&self, id: &str) -> Result<(), ApiError> {
    self
      .call(
        Method::DELETE,
        &format!("propertytype/{id}"),
        &[],
        None,
        Auth::Bearer,
      )
      .await?;
    Ok(())
  }

  // ==========================================================================
  // Subscription plans
  // ==========================================================================

  pub async fn plans(&self) -> Result<Vec<Plan>, ApiError> {
    self
      .call(Method::GET, "subscription", &[], None, Auth::Public)
      .await?
      .decode()
  }

  pub async fn create_plan(&self, draft: &PlanDraft) -> Result<(), ApiError> {
    let body = serde_json::to_value(draft)?;
    self
      .call(Method::POST, "subscription", &[], Some(body), Auth::Bearer)
      .await?;
    Ok(())
  }

  pub async fn update_plan(&self, id: &str, draft: &PlanDraft) -> Result<(), ApiError> {
    let body = serde_json::to_value(draft)?;
    self
      .call(
        Method::PUT,
        &format!("subscription/{id}"),
        &[],
        Some(body),
        Auth::Bearer,
      )
      .await?;
    Ok(())
  }

  pub async fn set_plan_status(&self, id: &str, active: bool) -> Result<(), ApiError> {
    let body = serde_json::json!({ "isActive": active });
    self
      .call(
        Method::PUT,
        &format!("subscription/status/{id}"),
        &[],
        Some(body),
        Auth::Bearer,
      )
      .await?;
    Ok(())
  }

  // ==========================================================================
  // Listings
  // ==========================================================================

  pub async fn listings(&self, params: &ListParams) -> Result<Page<Listing>, ApiError> {
    self
      .call(
        Method::GET,
        "listing/",
        &params.to_query(),
        None,
        Auth::Public,
      )
      .await?
      .decode_page(params)
  }

  pub async fn listing(&self, id: &str) -> Result<Listing, ApiError> {
    self
      .call(
        Method::GET,
        &format!("listing/{id}"),
        &[],
        None,
        Auth::Public,
      )
      .await?
      .decode()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::Session;
  use chrono::{Duration, Utc};
  use wiremock::matchers::{header, method, path, query_param};
  use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

  fn authed_store() -> SessionStore {
    let store = SessionStore::in_memory();
    store.install(Session {
      subject_id: "u1".to_string(),
      admin_name: "Ada Admin".to_string(),
      admin_email: "ada@example.com".to_string(),
      role: "ADMIN".to_string(),
      token: "tok-123".to_string(),
      refresh_token: None,
      expires_at: Utc::now() + Duration::days(7),
    });
    store
  }

  struct NoAuthHeader;

  impl Match for NoAuthHeader {
    fn matches(&self, request: &Request) -> bool {
      request.headers.get("authorization").is_none()
    }
  }

  #[tokio::test]
  async fn test_bearer_token_and_query_params_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/user/all-user"))
      .and(header("authorization", "Bearer tok-123"))
      .and(query_param("searchTerm", "Olivia"))
      .and(query_param("role", "AGENT"))
      .and(query_param("page", "1"))
      .and(query_param("limit", "10"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "meta": { "total": 1, "page": 1, "limit": 10 },
        "data": [{
          "_id": "u1",
          "fullName": "Olivia Rhye",
          "email": "olivia@example.com",
          "role": "AGENT"
        }]
      })))
      .expect(1)
      .mount(&server)
      .await;

    let client = ApiClient::new(&server.uri(), authed_store()).unwrap();
    let params = ListParams {
      search: Some("Olivia".to_string()),
      filters: vec![("role", "AGENT".to_string())],
      ..Default::default()
    };
    let page = client.users(&params).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].full_name, "Olivia Rhye");
  }

  #[tokio::test]
  async fn test_protected_call_without_session_fails_before_network() {
    let server = MockServer::start().await;
    // No mock mounted; the call must not reach the server at all.
    let client = ApiClient::new(&server.uri(), SessionStore::in_memory()).unwrap();
    let err = client.overview().await.unwrap_err();
    assert!(matches!(err, ApiError::Auth(_)));
    assert_eq!(err.to_string(), "no active session");
  }

  #[tokio::test]
  async fn test_server_message_surfaces_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .and(path("/propertytype/pt9"))
      .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
        "success": false,
        "message": "Property type not found"
      })))
      .mount(&server)
      .await;

    let client = ApiClient::new(&server.uri(), authed_store()).unwrap();
    let err = client.delete_property_type("pt9").await.unwrap_err();
    match err {
      ApiError::Request { status, message } => {
        assert_eq!(status, 404);
        assert_eq!(message, "Property type not found");
      }
      other => panic!("expected request error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_non_json_error_body_gets_status_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/dashboard/"))
      .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
      .mount(&server)
      .await;

    let client = ApiClient::new(&server.uri(), authed_store()).unwrap();
    let err = client.overview().await.unwrap_err();
    match err {
      ApiError::Request { status, message } => {
        assert_eq!(status, 502);
        assert_eq!(message, "request failed with status 502");
      }
      other => panic!("expected request error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_success_false_on_http_200_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/user/approved-agent/u1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": false,
        "message": "Agent already approved"
      })))
      .mount(&server)
      .await;

    let client = ApiClient::new(&server.uri(), authed_store()).unwrap();
    let err = client.approve_agent("u1").await.unwrap_err();
    assert_eq!(err.to_string(), "Agent already approved");
  }

  #[tokio::test]
  async fn test_public_endpoint_sends_no_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/subscription"))
      .and(NoAuthHeader)
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "data": [{
          "_id": "p1",
          "name": "Gold",
          "discription": "Full access",
          "amount": 49.0,
          "type": "monthly",
          "status": "active"
        }]
      })))
      .expect(1)
      .mount(&server)
      .await;

    // Even with a live session, storefront reads stay public.
    let client = ApiClient::new(&server.uri(), authed_store()).unwrap();
    let plans = client.plans().await.unwrap();
    assert_eq!(plans.len(), 1);
    assert!(plans[0].is_active());
  }

  #[tokio::test]
  async fn test_login_failure_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/auth/login"))
      .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
        "success": false,
        "message": "Invalid email or password"
      })))
      .mount(&server)
      .await;

    let client = ApiClient::new(&server.uri(), SessionStore::in_memory()).unwrap();
    let err = client.login("ada@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::Auth(_)));
    assert_eq!(err.to_string(), "Invalid email or password");
  }

  #[tokio::test]
  async fn test_base_url_without_trailing_slash_keeps_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/v1/listing/l1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "data": { "_id": "l1", "title": "Cozy Studio", "price": 90000 }
      })))
      .mount(&server)
      .await;

    let base = format!("{}/api/v1", server.uri());
    let client = ApiClient::new(&base, SessionStore::in_memory()).unwrap();
    let listing = client.listing("l1").await.unwrap();
    assert_eq!(listing.title, "Cozy Studio");
  }
}
