use std::sync::Arc;
use tracing::{info, warn};

use stockwatch::api::{run_server, AppState};
use stockwatch::config::AppConfig;
use stockwatch::engine::WatchlistEngine;
use stockwatch::provider::{QuoteProvider, YahooQuoteProvider};
use stockwatch::refresher::Refresher;
use stockwatch::store::{JsonFileStore, MemoryStore, WatchlistStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Setup Logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    dotenvy::dotenv().ok();

    info!("Starting stockwatch...");

    let config_path =
        std::env::var("STOCKWATCH_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    let config = AppConfig::load(&config_path)?;
    info!("Loaded configuration from {config_path}");

    let store: Arc<dyn WatchlistStore> = match &config.store_path {
        Some(path) => {
            info!("Using JSON file store at {path}");
            Arc::new(JsonFileStore::new(path))
        }
        None => {
            warn!("No store_path configured; watchlist will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };

    let provider: Arc<dyn QuoteProvider> = Arc::new(YahooQuoteProvider::new(&config.provider)?);
    info!("Quote provider: {}", provider.name());

    let engine = Arc::new(WatchlistEngine::new(store, provider));

    let loaded = engine.load().await?;
    info!("Loaded {loaded} persisted symbols");

    // Initial fetch is best-effort: the persisted view is already displayable.
    if let Err(e) = engine.refresh_all().await {
        warn!("Initial refresh failed: {e}");
    }

    let refresher = Refresher::new(engine.clone(), config.refresh_interval_secs);
    refresher.start();

    let state = Arc::new(AppState { engine, config });
    run_server(state).await?;

    Ok(())
}
