//! Minting service — entry point.
//!
//! Wires the SQLite asset registry, a shared outbound HTTP client, and the
//! Axum REST API. Each mint pipeline run is request-scoped; there are no
//! background workers.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use minter::api::{self, ApiState};
use minter::config::Config;
use minter::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    // Load config from environment.
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url).await?;

    // HTTP client shared by every outbound adapter.
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let state = Arc::new(ApiState {
        pool,
        client,
        config: config.clone(),
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/mint", post(api::mint))
        .route("/assets", get(api::get_assets))
        .route("/assets/:id", get(api::get_asset))
        .route("/assets/:id/listings", post(api::create_listing))
        .route("/listings", get(api::get_listings))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
