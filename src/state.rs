// src/state.rs

use crate::config::AppConfig;
use crate::services::{CatalogProvider, TokenVerifier};
use crate::store::CartStore;
use std::sync::Arc;

/// Shared, explicitly constructed application state.
///
/// The store and collaborator clients sit behind trait objects so tests can
/// swap in an in-memory store and fake collaborators without touching the
/// handlers.
#[derive(Clone)]
pub struct AppState {
  pub cart_store: Arc<dyn CartStore>,
  pub catalog: Arc<dyn CatalogProvider>,
  pub token_verifier: Arc<dyn TokenVerifier>,
  pub config: Arc<AppConfig>,
}
