// src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  /// Base URL of the catalog (book) service, e.g. `http://localhost:8002`.
  pub book_service_url: String,
  /// Base URL of the identity service, e.g. `http://localhost:8001`.
  pub auth_service_url: String,

  /// Per-request ceiling for collaborator calls, in seconds. A slow
  /// collaborator makes the enclosing request slow up to this bound.
  pub http_client_timeout_secs: u64,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Internal(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8003".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Internal(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let book_service_url = get_env("BOOK_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8002".to_string());
    let auth_service_url = get_env("AUTH_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8001".to_string());

    let http_client_timeout_secs = get_env("HTTP_CLIENT_TIMEOUT_SECS")
      .unwrap_or_else(|_| "5".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Internal(format!("Invalid HTTP_CLIENT_TIMEOUT_SECS: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      book_service_url,
      auth_service_url,
      http_client_timeout_secs,
    })
  }
}
