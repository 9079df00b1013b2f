// src/services/mod.rs

//! Clients for the two collaborator services this one depends on but does
//! not implement: the catalog (book) service and the identity service.

pub mod catalog;
pub mod identity;

pub use catalog::{BookSnapshot, CatalogError, CatalogProvider, HttpCatalogClient};
pub use identity::{AuthError, HttpTokenVerifier, TokenVerifier, VerifiedUser};
