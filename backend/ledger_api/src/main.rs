//! Crowdfund ledger host: entry point.
//!
//! Deploys the reward token and campaign registry into an in-process
//! ledger, journals every committed event to SQLite, and serves the ledger
//! over a small Axum REST API.

mod api;
mod config;
mod db;
mod errors;
mod events;
mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controls verbosity.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Optional .env file.
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let pool = db::init_pool(&config.database_url).await?;

    let state = AppState::deploy(pool, &config)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let app = api::router(Arc::new(state));

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
