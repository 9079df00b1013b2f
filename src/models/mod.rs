// src/models/mod.rs

//! Data structures representing persisted cart documents.

pub mod cart;

// Re-export the model structs for convenient access
pub use cart::{Cart, CartItem};
