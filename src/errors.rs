// src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::services::{AuthError, CatalogError};
use crate::store::StoreError;

/// Top-level error taxonomy. Every failure is surfaced immediately to the
/// caller as `{success: false, error: <message>}`; nothing at this layer is
/// retried and there are no partial-success responses.
#[derive(Debug, Error)]
pub enum AppError {
  /// Malformed or missing request fields. Never retried.
  #[error("{0}")]
  Validation(String),

  /// Missing, malformed, invalid, or expired credential. No partial
  /// processing occurs before this is raised.
  #[error("{0}")]
  Auth(#[from] AuthError),

  /// Collaborator failure while enriching an add-to-cart request; the add is
  /// abandoned entirely with no partial cart write.
  #[error("Failed to fetch book details: {0}")]
  Catalog(#[from] CatalogError),

  /// Persistence failure. Item-not-found mutations also travel this path
  /// and keep the generic 500 mapping.
  #[error("{0}")]
  Store(StoreError),

  #[error("Internal server error: {0}")]
  Internal(String),
}

impl From<StoreError> for AppError {
  fn from(err: StoreError) -> Self {
    match err {
      // A quantity the cart cannot hold is a caller problem; it joins the
      // other validation failures on the 400 path.
      StoreError::QuantityOverflow => {
        AppError::Validation("Quantity exceeds the supported maximum".to_string())
      }
      other => AppError::Store(other),
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response.
    tracing::error!(application_error = %self, "Responding with error");
    let body = json!({"success": false, "error": self.to_string()});
    match self {
      AppError::Validation(_) => HttpResponse::BadRequest().json(body),
      AppError::Auth(_) => HttpResponse::Unauthorized().json(body),
      AppError::Catalog(_) | AppError::Store(_) | AppError::Internal(_) => {
        HttpResponse::InternalServerError().json(body)
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::http::StatusCode;

  #[test]
  fn status_mapping_follows_the_taxonomy() {
    let cases = [
      (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
      (AppError::Auth(AuthError::InvalidToken), StatusCode::UNAUTHORIZED),
      (
        AppError::Catalog(CatalogError::Unavailable("down".into())),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
      // Item-not-found is treated as a generic failure, not a 404.
      (
        AppError::Store(StoreError::ItemNotFound),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
      // An overflowing quantity is a caller error, not a storage fault.
      (
        AppError::from(StoreError::QuantityOverflow),
        StatusCode::BAD_REQUEST,
      ),
    ];
    for (err, expected) in cases {
      assert_eq!(err.error_response().status(), expected);
    }
  }
}
