// src/lib.rs

//! cart-service: a per-user shopping-cart microservice.
//!
//! Stores one cart document per user, exposes CRUD-style HTTP operations on
//! it, enriches added items with a price/title/image snapshot from the
//! external catalog service, and validates callers against the external
//! identity service.
//!
//! The interesting part lives in [`store`]: mutation semantics as a pure
//! `(Cart, Command) -> Cart` function, wrapped by a Postgres store whose
//! read-modify-write cycle is guarded with optimistic versioning.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

// --- Re-exports for the Public API ---
pub use crate::errors::AppError;
pub use crate::state::AppState;
