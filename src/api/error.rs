//! Error taxonomy for backend calls.
//!
//! Failures are split by where they can be handled: `Auth` ends the session,
//! `Request` carries the backend's own message for display, `Validation` never
//! reaches the network, and `Transport`/`Decode` are plumbing failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
  /// Sign-in was refused, either by the backend or by the admin-role gate.
  #[error("{0}")]
  Auth(String),

  /// The backend answered with a non-success status. `message` is taken from
  /// the response body when present, so views can show the server's wording.
  #[error("{message}")]
  Request { status: u16, message: String },

  /// Input rejected locally, before any request was issued.
  #[error("{0}")]
  Validation(String),

  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("invalid base URL: {0}")]
  BaseUrl(#[from] url::ParseError),

  #[error("unexpected response shape: {0}")]
  Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_request_error_displays_server_message() {
    let err = ApiError::Request { status: 404, message: "User not found".to_string() };
    assert_eq!(err.to_string(), "User not found");
    assert!(matches!(err, ApiError::Request { status: 404, .. }));
  }

  #[test]
  fn test_auth_error_displays_reason() {
    let err = ApiError::Auth("Access denied! Only admin can login.".to_string());
    assert_eq!(err.to_string(), "Access denied! Only admin can login.");
  }
}
