// src/store/mod.rs

//! Cart persistence: the only component with real invariants.
//!
//! Mutation semantics live in [`commands`] as a pure function; the store
//! implementations wrap that function with persistence. `PgCartStore` is the
//! production backend, `MemoryCartStore` backs tests and local runs.

pub mod commands;
pub mod memory;
pub mod pg;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Cart, CartItem};

pub use commands::{apply, CartCommand, CommandError};
pub use memory::MemoryCartStore;
pub use pg::PgCartStore;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("item not found in cart")]
  ItemNotFound,

  #[error("quantity exceeds the supported maximum")]
  QuantityOverflow,

  #[error("cart was modified concurrently and retries were exhausted")]
  WriteConflict,

  #[error("cart storage failed: {0}")]
  Database(#[from] sqlx::Error),
}

impl From<CommandError> for StoreError {
  fn from(err: CommandError) -> Self {
    match err {
      CommandError::ItemNotFound => StoreError::ItemNotFound,
      CommandError::QuantityOverflow => StoreError::QuantityOverflow,
    }
  }
}

/// Persistence contract for cart documents, keyed by `user_id`.
///
/// Absence is self-healing: every operation runs get-or-create first, so no
/// operation can fail because the user has never had a cart.
#[async_trait]
pub trait CartStore: Send + Sync {
  /// Look up the user's cart, creating and persisting an empty one if absent.
  async fn get_or_create(&self, user_id: &str) -> Result<Cart, StoreError>;

  /// Merge-or-append `item` (see [`CartCommand::Add`]) and persist.
  /// Returns the resulting stored line-item for the item's `book_id`.
  async fn add_item(&self, user_id: &str, item: CartItem) -> Result<CartItem, StoreError>;

  /// Set the quantity of an existing line. `quantity >= 1` is the caller's
  /// responsibility. Fails with [`StoreError::ItemNotFound`] if absent.
  async fn update_item_quantity(
    &self,
    user_id: &str,
    item_id: Uuid,
    quantity: i32,
  ) -> Result<(), StoreError>;

  /// Remove an existing line, preserving the order of the remaining lines.
  /// Fails with [`StoreError::ItemNotFound`] if absent.
  async fn remove_item(&self, user_id: &str, item_id: Uuid) -> Result<(), StoreError>;

  /// Empty the cart. Idempotent; the cart document itself persists.
  async fn clear(&self, user_id: &str) -> Result<(), StoreError>;
}
