// src/web/routes.rs

use actix_web::web;
use tracing::debug;

use crate::errors::AppError;
use crate::web::handlers::cart_handlers;

// Liveness probe; deliberately unauthenticated.
async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok", "service": "cart-service" }))
}

/// Route table, called from `main.rs` (and the integration tests) to
/// configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    // Malformed JSON bodies get the same `{success:false, error}` envelope
    // as every other validation failure.
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
      debug!(error = %err, "rejecting malformed request body");
      AppError::Validation("Invalid request body".to_string()).into()
    }))
    .route("/health", web::get().to(health_check_handler))
    .route("/", web::get().to(cart_handlers::get_cart_handler))
    .route("/", web::delete().to(cart_handlers::clear_cart_handler))
    .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
    .route(
      "/items/{item_id}",
      web::put().to(cart_handlers::update_cart_item_handler),
    )
    .route(
      "/items/{item_id}",
      web::delete().to(cart_handlers::remove_from_cart_handler),
    );
}
