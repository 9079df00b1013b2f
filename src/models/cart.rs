// src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's shopping cart. Exactly one document exists per `user_id`;
/// absence is self-healing (the store creates an empty cart on first read).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
  pub id: Uuid,
  pub user_id: String,
  pub items: Vec<CartItem>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  /// An empty cart for `user_id`, both timestamps set to now.
  pub fn empty(user_id: impl Into<String>) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id: user_id.into(),
      items: Vec::new(),
      created_at: now,
      updated_at: now,
    }
  }
}

/// One line in a cart: a catalog reference plus a quantity and the
/// price/title/image snapshot captured when the line was first added.
/// The snapshot is intentionally not refreshed on later catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub id: Uuid,
  pub book_id: String,
  pub quantity: i32,
  pub price: f64,
  pub title: String,
  pub image_url: String,
}
