mod api;
mod catalog;
mod config;
mod db;
mod display;
mod error;
mod fetcher;
mod refresh;
mod state;
mod tally;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::db::{open_pool, DocumentStore};
use crate::error::Result;
use crate::fetcher::http_client;
use crate::refresh::{refresh_once, GiveawayRefresher};
use crate::state::GiveawayCache;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let pool = open_pool(&cfg.db_path).await?;
    info!("Database ready at {}", cfg.db_path);
    let store = Arc::new(DocumentStore::new(pool));

    // --- Bootstrap: first giveaway fetch ---
    let client = http_client(&cfg)?;
    let cache = GiveawayCache::new();
    let health = Arc::new(HealthState::new());

    match refresh_once(&client, &cfg, &cache, &health).await {
        Ok(count) => info!("Bootstrap complete: {count} giveaways cached"),
        // Serve saved items and results anyway; the refresher retries on its interval.
        Err(e) => warn!("Bootstrap fetch failed, starting with an empty list: {e}"),
    }
    if cfg.cors_proxy_url.is_none() {
        info!("CORS_PROXY_URL not set; giveaway fetches have no proxy fallback.");
    }

    // --- Background refresh ---
    let refresher = GiveawayRefresher::new(
        cfg.clone(),
        client.clone(),
        Arc::clone(&cache),
        Arc::clone(&health),
    );
    tokio::spawn(async move { refresher.run().await });

    // --- HTTP API server ---
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let api_state = ApiState {
        cfg: Arc::new(cfg),
        client,
        cache,
        store,
        health,
    };
    let app = router(api_state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
