//! Integration tests for the watchlist system.
//! These tests verify that the engine, store, and provider contract work
//! together across a full user session.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use stockwatch::api::{router, AppState};
use stockwatch::config::{AppConfig, ProviderConfig};
use stockwatch::engine::{RefreshOutcome, WatchlistEngine};
use stockwatch::error::ProviderError;
use stockwatch::model::{Category, Rank, StockQuote, WatchlistEntry};
use stockwatch::provider::QuoteProvider;
use stockwatch::store::{MemoryStore, WatchlistStore};

/// Provider double replaying scripted batch results in call order.
struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<Vec<StockQuote>, ProviderError>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<Vec<StockQuote>, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait::async_trait]
impl QuoteProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_quotes(&self, _symbols: &[String]) -> Result<Vec<StockQuote>, ProviderError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }
}

fn quote(symbol: &str, name: &str, price: f64) -> StockQuote {
    StockQuote {
        short_name: Some(name.to_string()),
        regular_market_price: Some(price),
        ..StockQuote::bare(symbol)
    }
}

/// A full session: load persisted symbols, refresh, add, recategorize,
/// remove — memory and store agree at every step.
#[tokio::test]
async fn full_watchlist_session() {
    let store = Arc::new(MemoryStore::with_entries(vec![
        WatchlistEntry::new("AAPL", Category::Active, Rank::Hot),
        WatchlistEntry::new("TSLA", Category::Watching, Rank::Cold),
    ]));
    let provider = ScriptedProvider::new(vec![
        // startup refresh
        Ok(vec![
            quote("AAPL", "Apple Inc.", 150.25),
            quote("TSLA", "Tesla, Inc.", 250.0),
        ]),
        // add_stock("nvda")
        Ok(vec![quote("NVDA", "NVIDIA Corporation", 480.0)]),
    ]);
    let engine = WatchlistEngine::new(store.clone(), provider);

    assert_eq!(engine.load().await.unwrap(), 2);
    assert_eq!(
        engine.refresh_all().await.unwrap(),
        RefreshOutcome::Applied { updated: 2 }
    );

    let added = engine
        .add_stock("nvda", Category::Active, Rank::VeryHot)
        .await
        .unwrap();
    assert_eq!(added.symbol, "NVDA");
    assert_eq!(added.market.regular_market_price, Some(480.0));

    let record = engine
        .recategorize("TSLA", Category::Active)
        .await
        .unwrap();
    assert_eq!(record.rank, Rank::Cold);
    // Market data survives a category move.
    assert_eq!(record.market.regular_market_price, Some(250.0));

    engine.remove_stock("AAPL").await.unwrap();

    let snap = engine.snapshot().await;
    let active: Vec<&str> = snap.active.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(active, ["NVDA", "TSLA"]);
    assert!(snap.watching.is_empty());
    assert_eq!(snap.symbols(), vec!["NVDA", "TSLA"]);

    let persisted = store.list_all().await.unwrap();
    let mut symbols: Vec<&str> = persisted.iter().map(|e| e.symbol.as_str()).collect();
    symbols.sort();
    assert_eq!(symbols, ["NVDA", "TSLA"]);
}

/// Whatever one engine persisted, a fresh engine instance reconstructs from
/// the store alone (market data starts unset again).
#[tokio::test]
async fn second_engine_rebuilds_from_store() {
    let store = Arc::new(MemoryStore::new());

    let first = WatchlistEngine::new(
        store.clone(),
        ScriptedProvider::new(vec![
            Ok(vec![quote("AAPL", "Apple Inc.", 150.0)]),
            Ok(vec![quote("MSFT", "Microsoft Corporation", 410.0)]),
        ]),
    );
    first.load().await.unwrap();
    first
        .add_stock("AAPL", Category::Active, Rank::Hot)
        .await
        .unwrap();
    first
        .add_stock("MSFT", Category::Watching, Rank::Cold)
        .await
        .unwrap();

    let second = WatchlistEngine::new(store, ScriptedProvider::new(vec![]));
    assert_eq!(second.load().await.unwrap(), 2);

    let snap = second.snapshot().await;
    assert_eq!(snap.active[0].symbol, "AAPL");
    assert_eq!(snap.active[0].rank, Rank::Hot);
    assert!(snap.active[0].market.is_unset());
    assert_eq!(snap.watching[0].symbol, "MSFT");
}

/// A provider outage mid-session leaves the last good view intact and
/// displayable.
#[tokio::test]
async fn provider_outage_keeps_last_good_view() {
    let store = Arc::new(MemoryStore::with_entries(vec![WatchlistEntry::new(
        "AAPL",
        Category::Active,
        Rank::Hot,
    )]));
    let provider = ScriptedProvider::new(vec![
        Ok(vec![quote("AAPL", "Apple Inc.", 150.0)]),
        Err(ProviderError::Http {
            status: 429,
            body: "too many requests".to_string(),
        }),
    ]);
    let engine = WatchlistEngine::new(store, provider);
    engine.load().await.unwrap();
    engine.refresh_all().await.unwrap();

    let before = engine.snapshot().await;
    assert!(engine.refresh_all().await.is_err());
    assert_eq!(engine.snapshot().await, before);
    assert_eq!(
        before.active[0].market.short_name.as_deref(),
        Some("Apple Inc.")
    );
}

fn test_state(engine: Arc<WatchlistEngine>) -> Arc<AppState> {
    Arc::new(AppState {
        engine,
        config: AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            store_path: None,
            refresh_interval_secs: 60,
            provider: ProviderConfig {
                base_url: "https://example.invalid".to_string(),
                api_host: "example.invalid".to_string(),
                api_key: None,
                timeout_secs: 5,
                region: "US".to_string(),
            },
        },
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The quote endpoint serves symbols that are not on the watchlist, without
/// tracking them.
#[tokio::test]
async fn quote_endpoint_serves_untracked_symbols() {
    let store = Arc::new(MemoryStore::new());
    let provider = ScriptedProvider::new(vec![Ok(vec![StockQuote {
        trailing_pe: Some(65.0),
        ..quote("NVDA", "NVIDIA Corporation", 480.0)
    }])]);
    let engine = Arc::new(WatchlistEngine::new(store.clone(), provider));
    let app = router(test_state(engine.clone()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/quotes/nvda")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["symbol"], "NVDA");
    assert_eq!(body["regularMarketPrice"], 480.0);
    assert_eq!(body["trailingPE"], 65.0);

    assert!(engine.snapshot().await.is_empty());
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn router_maps_unknown_symbol_to_not_found() {
    let store = Arc::new(MemoryStore::new());
    let provider = ScriptedProvider::new(vec![Ok(vec![])]);
    let engine = Arc::new(WatchlistEngine::new(store, provider));
    let app = router(test_state(engine));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/quotes/ZZZZ")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("ZZZZ"));
}

#[tokio::test]
async fn router_maps_provider_failure_to_bad_gateway() {
    let store = Arc::new(MemoryStore::new());
    let provider = ScriptedProvider::new(vec![Err(ProviderError::Http {
        status: 429,
        body: "too many requests".to_string(),
    })]);
    let engine = Arc::new(WatchlistEngine::new(store, provider));
    let app = router(test_state(engine));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/quotes/AAPL")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn router_rejects_unknown_category_with_bad_request() {
    let store = Arc::new(MemoryStore::new());
    let provider = ScriptedProvider::new(vec![]);
    let engine = Arc::new(WatchlistEngine::new(store.clone(), provider));
    let app = router(test_state(engine));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/stocks")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"symbol": "AAPL", "category": "Archived", "rank": "Hot"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Archived"));
    assert!(store.list_all().await.unwrap().is_empty());
}

/// Snapshots are copies: mutating one must not leak back into the engine.
#[tokio::test]
async fn snapshot_is_detached_from_engine_state() {
    let store = Arc::new(MemoryStore::with_entries(vec![WatchlistEntry::new(
        "AAPL",
        Category::Active,
        Rank::Hot,
    )]));
    let engine = WatchlistEngine::new(store, ScriptedProvider::new(vec![]));
    engine.load().await.unwrap();

    let mut snap = engine.snapshot().await;
    snap.active.clear();

    assert_eq!(engine.snapshot().await.active.len(), 1);
}
