// src/store/pg.rs

//! Postgres-backed cart store.
//!
//! Each cart is one row keyed by a unique `user_id`, with the line-items held
//! as a single JSONB document column. Every mutation is read-modify-write
//! through the pure [`commands::apply`] function, guarded by an optimistic
//! version check: the UPDATE only matches when the row still carries the
//! version that was read, so a concurrent writer forces a bounded re-read and
//! re-apply instead of a silent lost update.

use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::models::{Cart, CartItem};
use crate::store::{commands, CartCommand, CartStore, StoreError};

/// Attempts per mutation before giving up with [`StoreError::WriteConflict`].
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Outcome of one optimistic write attempt.
enum WriteAttempt {
  Committed(Cart),
  /// The version guard did not match: another writer committed between our
  /// read and our write.
  VersionMiss,
}

/// The retry policy around the optimistic write: re-run `attempt` on a
/// version miss, up to [`MAX_WRITE_ATTEMPTS`] times, then give up with
/// [`StoreError::WriteConflict`]. Backend errors abort immediately.
async fn write_with_retry<F, Fut>(user_id: &str, mut attempt: F) -> Result<Cart, StoreError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<WriteAttempt, StoreError>>,
{
  for attempt_no in 1..=MAX_WRITE_ATTEMPTS {
    match attempt().await? {
      WriteAttempt::Committed(cart) => return Ok(cart),
      WriteAttempt::VersionMiss => {
        warn!(
          user_id,
          attempt = attempt_no,
          "cart version changed under a mutation; retrying read-modify-write"
        );
      }
    }
  }

  Err(StoreError::WriteConflict)
}

#[derive(Debug, FromRow)]
struct CartRow {
  id: Uuid,
  user_id: String,
  items: Json<Vec<CartItem>>,
  version: i64,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl CartRow {
  fn into_parts(self) -> (Cart, i64) {
    (
      Cart {
        id: self.id,
        user_id: self.user_id,
        items: self.items.0,
        created_at: self.created_at,
        updated_at: self.updated_at,
      },
      self.version,
    )
  }
}

#[derive(Debug, Clone)]
pub struct PgCartStore {
  pool: PgPool,
}

impl PgCartStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn fetch(&self, user_id: &str) -> Result<Option<CartRow>, StoreError> {
    let row = sqlx::query_as::<_, CartRow>(
      "SELECT id, user_id, items, version, created_at, updated_at \
       FROM carts WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row)
  }

  /// Find-or-create keyed by `user_id`. The insert uses
  /// `ON CONFLICT (user_id) DO NOTHING` followed by a re-read, so a
  /// concurrent first-write race resolves to a single row instead of a
  /// duplicate-key failure, and creation happens at most once per user.
  async fn fetch_or_insert(&self, user_id: &str) -> Result<CartRow, StoreError> {
    if let Some(row) = self.fetch(user_id).await? {
      return Ok(row);
    }

    let cart = Cart::empty(user_id);
    sqlx::query(
      "INSERT INTO carts (id, user_id, items, version, created_at, updated_at) \
       VALUES ($1, $2, $3, 0, $4, $5) \
       ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(cart.id)
    .bind(&cart.user_id)
    .bind(Json(&cart.items))
    .bind(cart.created_at)
    .bind(cart.updated_at)
    .execute(&self.pool)
    .await?;

    match self.fetch(user_id).await? {
      Some(row) => Ok(row),
      // The row we just inserted (or the concurrent winner) is gone; only a
      // misbehaving backend can do that.
      None => Err(StoreError::Database(sqlx::Error::RowNotFound)),
    }
  }

  /// One read-modify-write pass: re-read the row, apply the command, and
  /// write the result under the version guard.
  async fn try_mutate(&self, user_id: &str, command: &CartCommand) -> Result<WriteAttempt, StoreError> {
    let (cart, version) = self.fetch_or_insert(user_id).await?.into_parts();
    let mut next = commands::apply(cart, command)?;
    next.updated_at = Utc::now();

    let result = sqlx::query(
      "UPDATE carts SET items = $1, updated_at = $2, version = version + 1 \
       WHERE user_id = $3 AND version = $4",
    )
    .bind(Json(&next.items))
    .bind(next.updated_at)
    .bind(user_id)
    .bind(version)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 1 {
      Ok(WriteAttempt::Committed(next))
    } else {
      Ok(WriteAttempt::VersionMiss)
    }
  }

  async fn mutate(&self, user_id: &str, command: CartCommand) -> Result<Cart, StoreError> {
    let store = self.clone();
    let user = user_id.to_string();
    write_with_retry(user_id, move || {
      let store = store.clone();
      let user = user.clone();
      let command = command.clone();
      async move { store.try_mutate(&user, &command).await }
    })
    .await
  }
}

#[async_trait]
impl CartStore for PgCartStore {
  #[instrument(name = "store::get_or_create", skip(self))]
  async fn get_or_create(&self, user_id: &str) -> Result<Cart, StoreError> {
    Ok(self.fetch_or_insert(user_id).await?.into_parts().0)
  }

  #[instrument(name = "store::add_item", skip(self, item), fields(book_id = %item.book_id))]
  async fn add_item(&self, user_id: &str, item: CartItem) -> Result<CartItem, StoreError> {
    let book_id = item.book_id.clone();
    let cart = self.mutate(user_id, CartCommand::Add(item)).await?;
    // The line for `book_id` is guaranteed present after a successful Add.
    cart
      .items
      .into_iter()
      .find(|line| line.book_id == book_id)
      .ok_or(StoreError::ItemNotFound)
  }

  #[instrument(name = "store::update_item_quantity", skip(self))]
  async fn update_item_quantity(
    &self,
    user_id: &str,
    item_id: Uuid,
    quantity: i32,
  ) -> Result<(), StoreError> {
    self
      .mutate(user_id, CartCommand::SetQuantity { item_id, quantity })
      .await?;
    Ok(())
  }

  #[instrument(name = "store::remove_item", skip(self))]
  async fn remove_item(&self, user_id: &str, item_id: Uuid) -> Result<(), StoreError> {
    self.mutate(user_id, CartCommand::Remove { item_id }).await?;
    Ok(())
  }

  #[instrument(name = "store::clear", skip(self))]
  async fn clear(&self, user_id: &str) -> Result<(), StoreError> {
    self.mutate(user_id, CartCommand::Clear).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};

  #[tokio::test]
  async fn a_version_miss_is_retried_until_the_write_commits() {
    let calls = AtomicU32::new(0);
    let cart = write_with_retry("u1", || {
      let call_no = calls.fetch_add(1, Ordering::SeqCst) + 1;
      async move {
        if call_no < MAX_WRITE_ATTEMPTS {
          Ok(WriteAttempt::VersionMiss)
        } else {
          Ok(WriteAttempt::Committed(Cart::empty("u1")))
        }
      }
    })
    .await
    .unwrap();

    assert_eq!(cart.user_id, "u1");
    assert_eq!(calls.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);
  }

  #[tokio::test]
  async fn exhausted_retries_surface_as_write_conflict() {
    let calls = AtomicU32::new(0);
    let err = write_with_retry("u1", || {
      calls.fetch_add(1, Ordering::SeqCst);
      async { Ok(WriteAttempt::VersionMiss) }
    })
    .await
    .unwrap_err();

    assert!(matches!(err, StoreError::WriteConflict));
    assert_eq!(calls.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);
  }

  #[tokio::test]
  async fn backend_errors_abort_without_retrying() {
    let calls = AtomicU32::new(0);
    let err = write_with_retry("u1", || {
      calls.fetch_add(1, Ordering::SeqCst);
      async { Err(StoreError::ItemNotFound) }
    })
    .await
    .unwrap_err();

    assert!(matches!(err, StoreError::ItemNotFound));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }
}
