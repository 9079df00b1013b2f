// src/services/identity.rs

//! Token verification against the external identity service.
//!
//! Every request re-verifies remotely: the raw bearer token is forwarded to
//! the identity service's `/me` endpoint and the caller's identity extracted
//! from the response. No local caching or expiry tracking.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// The caller as reported by the identity service. Only `id` drives
/// authorization; the profile fields ride along for logging.
#[derive(Debug, Clone)]
pub struct VerifiedUser {
  pub id: String,
  pub username: String,
  pub email: String,
}

/// All verification failures are surfaced to the caller as 401.
#[derive(Debug, Error)]
pub enum AuthError {
  #[error("Authorization header is required")]
  MissingHeader,

  #[error("Invalid authorization header format")]
  MalformedHeader,

  #[error("failed to verify token: {0}")]
  Verification(String),

  #[error("invalid token")]
  InvalidToken,

  #[error("user ID not found in response")]
  MissingIdentity,
}

/// Verification seam so handlers can be exercised against a fake verifier.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
  async fn verify(&self, token: &str) -> Result<VerifiedUser, AuthError>;
}

#[derive(Debug, Deserialize)]
struct IdentityProfile {
  #[serde(default)]
  id: String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  email: String,
}

/// HTTP implementation against the real identity service.
#[derive(Debug, Clone)]
pub struct HttpTokenVerifier {
  base_url: String,
  http: Client,
}

impl HttpTokenVerifier {
  /// `http` is the process-wide client; it carries the bounded request
  /// timeout configured at startup.
  pub fn new(base_url: impl Into<String>, http: Client) -> Self {
    Self {
      base_url: base_url.into(),
      http,
    }
  }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
  #[instrument(name = "identity::verify", skip(self, token))]
  async fn verify(&self, token: &str) -> Result<VerifiedUser, AuthError> {
    let url = format!("{}/me", self.base_url);

    let response = self
      .http
      .get(&url)
      .bearer_auth(token)
      .send()
      .await
      .map_err(|e| AuthError::Verification(e.to_string()))?;

    if response.status() != StatusCode::OK {
      return Err(AuthError::InvalidToken);
    }

    let profile: IdentityProfile = response
      .json()
      .await
      .map_err(|e| AuthError::Verification(format!("undecodable identity response: {e}")))?;

    if profile.id.is_empty() {
      return Err(AuthError::MissingIdentity);
    }

    debug!(user_id = %profile.id, "token verified");
    Ok(VerifiedUser {
      id: profile.id,
      username: profile.username,
      email: profile.email,
    })
  }
}
