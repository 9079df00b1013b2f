// src/web/auth.rs

//! Bearer-credential extraction for the cart endpoints.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::errors::AppError;
use crate::services::AuthError;
use crate::state::AppState;

/// The verified caller. Extraction parses the `Authorization: Bearer <token>`
/// header and forwards the raw token to the identity service on every
/// request; there is no local session state.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user_id: String,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let req = req.clone();
    Box::pin(async move {
      let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state is not configured".to_string()))?;

      let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;
      let raw = header_value.to_str().map_err(|_| AuthError::MalformedHeader)?;
      let token = raw
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MalformedHeader)?;

      let user = state.token_verifier.verify(token).await.map_err(|e| {
        warn!(error = %e, "token verification failed");
        e
      })?;

      Ok(AuthenticatedUser { user_id: user.id })
    })
  }
}
