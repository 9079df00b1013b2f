// src/store/memory.rs

//! In-memory cart store.
//!
//! Backs the test suite and is handy for running the service without a
//! database. The single mutex serializes mutations per process, so the
//! read-modify-write sequence needs no version guard here.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::{Cart, CartItem};
use crate::store::{commands, CartCommand, CartStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryCartStore {
  carts: Mutex<HashMap<String, Cart>>,
}

impl MemoryCartStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn mutate_locked(&self, user_id: &str, command: &CartCommand) -> Result<Cart, StoreError> {
    let mut carts = self.carts.lock();
    let current = carts
      .entry(user_id.to_string())
      .or_insert_with(|| Cart::empty(user_id))
      .clone();

    let mut next = commands::apply(current, command)?;
    next.updated_at = Utc::now();
    carts.insert(user_id.to_string(), next.clone());
    Ok(next)
  }
}

#[async_trait]
impl CartStore for MemoryCartStore {
  async fn get_or_create(&self, user_id: &str) -> Result<Cart, StoreError> {
    let mut carts = self.carts.lock();
    Ok(
      carts
        .entry(user_id.to_string())
        .or_insert_with(|| Cart::empty(user_id))
        .clone(),
    )
  }

  async fn add_item(&self, user_id: &str, item: CartItem) -> Result<CartItem, StoreError> {
    let book_id = item.book_id.clone();
    let cart = self.mutate_locked(user_id, &CartCommand::Add(item))?;
    cart
      .items
      .into_iter()
      .find(|line| line.book_id == book_id)
      .ok_or(StoreError::ItemNotFound)
  }

  async fn update_item_quantity(
    &self,
    user_id: &str,
    item_id: Uuid,
    quantity: i32,
  ) -> Result<(), StoreError> {
    self.mutate_locked(user_id, &CartCommand::SetQuantity { item_id, quantity })?;
    Ok(())
  }

  async fn remove_item(&self, user_id: &str, item_id: Uuid) -> Result<(), StoreError> {
    self.mutate_locked(user_id, &CartCommand::Remove { item_id })?;
    Ok(())
  }

  async fn clear(&self, user_id: &str) -> Result<(), StoreError> {
    self.mutate_locked(user_id, &CartCommand::Clear)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(book_id: &str, quantity: i32) -> CartItem {
    CartItem {
      id: Uuid::new_v4(),
      book_id: book_id.to_string(),
      quantity,
      price: 19.99,
      title: "Go Guide".to_string(),
      image_url: "http://images.test/b1.jpg".to_string(),
    }
  }

  #[tokio::test]
  async fn get_or_create_is_idempotent_for_a_new_user() {
    let store = MemoryCartStore::new();
    let first = store.get_or_create("u1").await.unwrap();
    let second = store.get_or_create("u1").await.unwrap();

    // Creation happened at most once: both reads see the same cart id.
    assert_eq!(first.id, second.id);
    assert!(second.items.is_empty());
  }

  #[tokio::test]
  async fn repeated_adds_accumulate_into_one_line() {
    let store = MemoryCartStore::new();
    store.add_item("u1", item("b1", 2)).await.unwrap();
    let line = store.add_item("u1", item("b1", 3)).await.unwrap();

    assert_eq!(line.quantity, 5);
    let cart = store.get_or_create("u1").await.unwrap();
    assert_eq!(cart.items.len(), 1);
  }

  #[tokio::test]
  async fn phantom_mutation_fails_and_leaves_cart_unchanged() {
    let store = MemoryCartStore::new();
    store.add_item("u1", item("b1", 1)).await.unwrap();
    let before = store.get_or_create("u1").await.unwrap();

    let err = store
      .update_item_quantity("u1", Uuid::new_v4(), 7)
      .await
      .unwrap_err();
    assert!(matches!(err, StoreError::ItemNotFound));

    let err = store.remove_item("u1", Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StoreError::ItemNotFound));

    let after = store.get_or_create("u1").await.unwrap();
    assert_eq!(after.items, before.items);
    assert_eq!(after.updated_at, before.updated_at);
  }

  #[tokio::test]
  async fn clear_twice_succeeds_and_leaves_empty_items() {
    let store = MemoryCartStore::new();
    store.add_item("u1", item("b1", 2)).await.unwrap();

    store.clear("u1").await.unwrap();
    assert!(store.get_or_create("u1").await.unwrap().items.is_empty());

    store.clear("u1").await.unwrap();
    assert!(store.get_or_create("u1").await.unwrap().items.is_empty());
  }
}
