//! Admin session state.
//!
//! The store holds the bearer token behind a shared lock so the API client,
//! the views, and the header can all read it, and mirrors it to a JSON file
//! so a restart within the validity window skips the login screen. Only
//! accounts with the admin role may hold a session here.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::types::ROLE_ADMIN;
use crate::api::{ApiClient, ApiError};

/// Sessions outlive restarts for a week, then the operator signs in again.
const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub subject_id: String,
  pub admin_name: String,
  pub admin_email: String,
  pub role: String,
  pub token: String,
  /// Rides along in the session file; the console re-authenticates on expiry
  /// instead of refreshing.
  #[serde(default)]
  pub refresh_token: Option<String>,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self) -> bool {
    Utc::now() >= self.expires_at
  }
}

/// Shared handle to the current session, if any.
#[derive(Clone)]
pub struct SessionStore {
  inner: Arc<RwLock<Option<Session>>>,
  path: Option<PathBuf>,
}

impl SessionStore {
  /// A store backed by `path`.
  pub fn new(path: PathBuf) -> Self {
    Self {
      inner: Arc::new(RwLock::new(None)),
      path: Some(path),
    }
  }

  /// A store that never touches the filesystem.
  pub fn in_memory() -> Self {
    Self {
      inner: Arc::new(RwLock::new(None)),
      path: None,
    }
  }

  /// Load a persisted session. Expired files are deleted rather than loaded.
  /// Returns whether a live session was restored.
  pub fn restore(&self) -> bool {
    let Some(path) = &self.path else {
      return false;
    };
    let Ok(raw) = fs::read_to_string(path) else {
      return false;
    };
    let session: Session = match serde_json::from_str(&raw) {
      Ok(session) => session,
      Err(err) => {
        warn!("ignoring unreadable session file: {err}");
        return false;
      }
    };
    if session.is_expired() {
      debug!("discarding expired session for {}", session.admin_email);
      if let Err(err) = fs::remove_file(path) {
        warn!("failed to remove expired session file: {err}");
      }
      return false;
    }
    *self.write() = Some(session);
    true
  }

  pub fn token(&self) -> Option<String> {
    self.read().as_ref().map(|s| s.token.clone())
  }

  pub fn admin_name(&self) -> Option<String> {
    self.read().as_ref().map(|s| s.admin_name.clone())
  }

  pub fn is_authenticated(&self) -> bool {
    self.read().is_some()
  }

  /// Sign in. Credentials are checked locally for presence first, then the
  /// backend decides, then the role gate rejects everyone but admins.
  pub async fn login(
    &self,
    api: &ApiClient,
    email: &str,
    password: &str,
  ) -> Result<(), ApiError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
      return Err(ApiError::Validation(
        "Please enter your email and password".to_string(),
      ));
    }

    let data = api.login(email, password).await?;
    if data.user.role != ROLE_ADMIN {
      return Err(ApiError::Auth(
        "Access denied! Only admin can login.".to_string(),
      ));
    }

    self.install(Session {
      subject_id: data.user.id,
      admin_name: data.user.full_name,
      admin_email: data.user.email,
      role: data.user.role,
      token: data.access_token,
      refresh_token: data.refresh_token,
      expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
    });
    Ok(())
  }

  /// Drop the current session and its file.
  pub fn logout(&self) {
    *self.write() = None;
    if let Some(path) = &self.path {
      if path.exists() {
        if let Err(err) = fs::remove_file(path) {
          warn!("failed to remove session file: {err}");
        }
      }
    }
  }

  pub(crate) fn install(&self, session: Session) {
    debug!("session installed for {} ({})", session.subject_id, session.role);
    self.persist(&session);
    *self.write() = Some(session);
  }

  /// Mirror the session to disk. Persistence is best effort; a read-only
  /// data directory only costs the operator a re-login next start.
  fn persist(&self, session: &Session) {
    let Some(path) = &self.path else {
      return;
    };
    let result = (|| -> std::io::Result<()> {
      if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
      }
      let raw = serde_json::to_string_pretty(session)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
      fs::write(path, raw)
    })();
    if let Err(err) = result {
      warn!("failed to persist session: {err}");
    }
  }

  fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
    self.inner.read().unwrap_or_else(|e| e.into_inner())
  }

  fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
    self.inner.write().unwrap_or_else(|e| e.into_inner())
  }
}
