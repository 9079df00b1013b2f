// src/store/commands.rs

//! The pure mutation core of the cart store.
//!
//! Every store mutation is expressed as "fetch current state, apply a pure
//! transformation, write the whole document back". `apply` is that
//! transformation: `(Cart, &CartCommand) -> Cart`, with no I/O and no clock.
//! Keeping it pure isolates the race-prone persistence wrapper (see
//! `store::pg`) from the semantics, and lets the semantics be tested directly.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Cart, CartItem};

/// A single item-level mutation against one user's cart.
#[derive(Debug, Clone)]
pub enum CartCommand {
  /// Merge-or-append: if the cart already holds a line with the same
  /// `book_id`, its quantity is incremented and the existing snapshot
  /// (price/title/image) is kept; otherwise the item is appended as a new
  /// line, preserving insertion order.
  Add(CartItem),
  /// Set the quantity of the line identified by `item_id`.
  SetQuantity { item_id: Uuid, quantity: i32 },
  /// Remove the line identified by `item_id`, preserving the order of the
  /// remaining lines.
  Remove { item_id: Uuid },
  /// Empty the cart. The cart document itself persists.
  Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
  #[error("item not found in cart")]
  ItemNotFound,

  /// Merging would push the line's quantity past `i32::MAX`.
  #[error("quantity exceeds the supported maximum")]
  QuantityOverflow,
}

/// Apply `command` to `cart`, returning the transformed cart.
///
/// Does not touch `updated_at`; timestamp refresh belongs to the persistence
/// wrapper that performs the write.
pub fn apply(mut cart: Cart, command: &CartCommand) -> Result<Cart, CommandError> {
  match command {
    CartCommand::Add(item) => {
      match cart.items.iter_mut().find(|line| line.book_id == item.book_id) {
        Some(line) => {
          // Repeated adds accumulate; the sum must stay a valid quantity.
          line.quantity = line
            .quantity
            .checked_add(item.quantity)
            .ok_or(CommandError::QuantityOverflow)?;
        }
        None => cart.items.push(item.clone()),
      }
    }
    CartCommand::SetQuantity { item_id, quantity } => {
      let line = cart
        .items
        .iter_mut()
        .find(|line| line.id == *item_id)
        .ok_or(CommandError::ItemNotFound)?;
      line.quantity = *quantity;
    }
    CartCommand::Remove { item_id } => {
      let position = cart
        .items
        .iter()
        .position(|line| line.id == *item_id)
        .ok_or(CommandError::ItemNotFound)?;
      cart.items.remove(position);
    }
    CartCommand::Clear => cart.items.clear(),
  }
  Ok(cart)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(book_id: &str, quantity: i32, price: f64, title: &str) -> CartItem {
    CartItem {
      id: Uuid::new_v4(),
      book_id: book_id.to_string(),
      quantity,
      price,
      title: title.to_string(),
      image_url: format!("http://images.test/{book_id}.jpg"),
    }
  }

  #[test]
  fn add_appends_new_line_preserving_order() {
    let cart = Cart::empty("u1");
    let cart = apply(cart, &CartCommand::Add(item("b1", 1, 9.99, "One"))).unwrap();
    let cart = apply(cart, &CartCommand::Add(item("b2", 2, 4.50, "Two"))).unwrap();

    let books: Vec<&str> = cart.items.iter().map(|l| l.book_id.as_str()).collect();
    assert_eq!(books, ["b1", "b2"]);
  }

  #[test]
  fn add_merges_quantity_and_keeps_first_snapshot() {
    let cart = Cart::empty("u1");
    let first = item("b1", 2, 19.99, "Go Guide");
    let first_id = first.id;
    let cart = apply(cart, &CartCommand::Add(first)).unwrap();

    // Second add for the same book carries a different snapshot; it must not
    // overwrite the one captured on the first add.
    let mut second = item("b1", 3, 25.00, "Go Guide (new edition)");
    second.image_url = "http://images.test/other.jpg".to_string();
    let cart = apply(cart, &CartCommand::Add(second)).unwrap();

    assert_eq!(cart.items.len(), 1);
    let line = &cart.items[0];
    assert_eq!(line.id, first_id);
    assert_eq!(line.quantity, 5);
    assert_eq!(line.price, 19.99);
    assert_eq!(line.title, "Go Guide");
    assert_eq!(line.image_url, "http://images.test/b1.jpg");
  }

  #[test]
  fn merge_that_would_overflow_quantity_is_rejected() {
    let cart = Cart::empty("u1");
    let cart = apply(cart, &CartCommand::Add(item("b1", i32::MAX, 1.0, "Big"))).unwrap();
    let err = apply(cart, &CartCommand::Add(item("b1", 1, 1.0, "Big"))).unwrap_err();
    assert_eq!(err, CommandError::QuantityOverflow);
  }

  #[test]
  fn set_quantity_updates_matching_line() {
    let cart = Cart::empty("u1");
    let line = item("b1", 1, 9.99, "One");
    let line_id = line.id;
    let cart = apply(cart, &CartCommand::Add(line)).unwrap();

    let cart = apply(
      cart,
      &CartCommand::SetQuantity {
        item_id: line_id,
        quantity: 4,
      },
    )
    .unwrap();
    assert_eq!(cart.items[0].quantity, 4);
  }

  #[test]
  fn set_quantity_on_unknown_item_fails() {
    let cart = Cart::empty("u1");
    let err = apply(
      cart,
      &CartCommand::SetQuantity {
        item_id: Uuid::new_v4(),
        quantity: 2,
      },
    )
    .unwrap_err();
    assert_eq!(err, CommandError::ItemNotFound);
  }

  #[test]
  fn remove_preserves_order_of_remaining_lines() {
    let cart = Cart::empty("u1");
    let a = item("a", 1, 1.0, "A");
    let b = item("b", 1, 2.0, "B");
    let c = item("c", 1, 3.0, "C");
    let b_id = b.id;

    let cart = apply(cart, &CartCommand::Add(a)).unwrap();
    let cart = apply(cart, &CartCommand::Add(b)).unwrap();
    let cart = apply(cart, &CartCommand::Add(c)).unwrap();

    let cart = apply(cart, &CartCommand::Remove { item_id: b_id }).unwrap();
    let books: Vec<&str> = cart.items.iter().map(|l| l.book_id.as_str()).collect();
    assert_eq!(books, ["a", "c"]);
  }

  #[test]
  fn remove_unknown_item_fails() {
    let cart = Cart::empty("u1");
    let cart = apply(cart, &CartCommand::Add(item("a", 1, 1.0, "A"))).unwrap();
    let err = apply(
      cart,
      &CartCommand::Remove {
        item_id: Uuid::new_v4(),
      },
    )
    .unwrap_err();
    assert_eq!(err, CommandError::ItemNotFound);
  }

  #[test]
  fn clear_is_idempotent() {
    let cart = Cart::empty("u1");
    let cart = apply(cart, &CartCommand::Add(item("a", 1, 1.0, "A"))).unwrap();
    let cart = apply(cart, &CartCommand::Clear).unwrap();
    assert!(cart.items.is_empty());
    let cart = apply(cart, &CartCommand::Clear).unwrap();
    assert!(cart.items.is_empty());
  }
}
