// src/web/handlers/cart_handlers.rs

//! Thin translation layer between HTTP and the cart store: validate the
//! request body, invoke the store (and the catalog, when adding), shape the
//! `{success, data}` envelope. No business logic beyond input validation
//! lives here.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::CartItem;
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

// --- Request DTOs ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
  pub book_id: String,
  pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
  pub quantity: i32,
}

fn validate_quantity(quantity: i32) -> Result<(), AppError> {
  if quantity < 1 {
    return Err(AppError::Validation("Quantity must be at least 1".to_string()));
  }
  Ok(())
}

fn parse_item_id(raw: &str) -> Result<Uuid, AppError> {
  Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid item ID".to_string()))
}

// --- Handlers ---

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart = app_state.cart_store.get_or_create(&auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({"success": true, "data": cart})))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, auth_user, payload),
  fields(user_id = %auth_user.user_id, book_id = %payload.book_id, quantity = payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  if payload.book_id.is_empty() {
    return Err(AppError::Validation("A book ID is required".to_string()));
  }
  validate_quantity(payload.quantity)?;

  // Snapshot first, then hand the store a fully-formed item. The store never
  // reaches out to the catalog itself, and a catalog failure abandons the add
  // before any cart write happens.
  let snapshot = app_state.catalog.book_by_id(&payload.book_id).await?;

  let item = CartItem {
    id: Uuid::new_v4(),
    book_id: snapshot.book_id,
    quantity: payload.quantity,
    price: snapshot.price,
    title: snapshot.title,
    image_url: snapshot.image_url,
  };

  let stored = app_state.cart_store.add_item(&auth_user.user_id, item).await?;
  info!(item_id = %stored.id, quantity = stored.quantity, "item added to cart");

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "data": {
      "message": "Item added to cart",
      "item": stored,
    }
  })))
}

#[instrument(
  name = "handler::update_cart_item",
  skip(app_state, auth_user, payload),
  fields(user_id = %auth_user.user_id, quantity = payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<String>,
  payload: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
  let item_id = parse_item_id(&path.into_inner())?;
  validate_quantity(payload.quantity)?;

  app_state
    .cart_store
    .update_item_quantity(&auth_user.user_id, item_id, payload.quantity)
    .await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "data": {"message": "Cart item updated"}
  })))
}

#[instrument(
  name = "handler::remove_from_cart",
  skip(app_state, auth_user),
  fields(user_id = %auth_user.user_id)
)]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let item_id = parse_item_id(&path.into_inner())?;

  app_state
    .cart_store
    .remove_item(&auth_user.user_id, item_id)
    .await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "data": {"message": "Item removed from cart"}
  })))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state.cart_store.clear(&auth_user.user_id).await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "data": {"message": "Cart cleared"}
  })))
}
