// src/main.rs

use cart_service::config::AppConfig;
use cart_service::services::{HttpCatalogClient, HttpTokenVerifier};
use cart_service::state::AppState;
use cart_service::store::PgCartStore;
use cart_service::web;

use actix_web::{web as actix_data, App, HttpServer}; // Renamed web to actix_data
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize tracing subscriber for logging
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting cart service...");

  // Load application configuration
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      panic!("Configuration error: {}", e);
    }
  };

  // Initialize Database Pool
  let db_pool = match PgPool::connect(&app_config.database_url).await {
    Ok(pool) => {
      tracing::info!("Successfully connected to the database.");
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      panic!("Database connection error: {}", e);
    }
  };

  if let Err(e) = sqlx::migrate!().run(&db_pool).await {
    tracing::error!(error = %e, "Failed to run database migrations.");
    panic!("Migration error: {}", e);
  }

  // One shared HTTP client for both collaborator services, with the bounded
  // per-request timeout.
  let http_client = match reqwest::Client::builder()
    .timeout(Duration::from_secs(app_config.http_client_timeout_secs))
    .build()
  {
    Ok(client) => client,
    Err(e) => {
      tracing::error!(error = %e, "Failed to build the collaborator HTTP client.");
      panic!("HTTP client error: {}", e);
    }
  };

  // Create AppState with the explicitly constructed store and clients.
  let app_state = AppState {
    cart_store: Arc::new(PgCartStore::new(db_pool.clone())),
    catalog: Arc::new(HttpCatalogClient::new(
      app_config.book_service_url.clone(),
      http_client.clone(),
    )),
    token_verifier: Arc::new(HttpTokenVerifier::new(
      app_config.auth_service_url.clone(),
      http_client,
    )),
    config: app_config.clone(),
  };

  // Configure and Start Actix Web Server
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Cart service listening on {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
