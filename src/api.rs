//! HTTP control surface: the display/controller binding over the engine.
//!
//! The engine returns typed errors; this layer is the only place they turn
//! into status codes and human-readable messages.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::engine::WatchlistEngine;
use crate::error::WatchlistError;
use crate::model::{Category, Rank};

pub struct AppState {
    pub engine: Arc<WatchlistEngine>,
    pub config: AppConfig,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/watchlist", get(get_watchlist))
        .route("/stocks", post(add_stock))
        .route("/stocks/{symbol}", delete(remove_stock))
        .route("/stocks/{symbol}/category", put(recategorize))
        .route("/quotes/{symbol}", get(get_quote))
        .route("/refresh", post(refresh))
        .with_state(state)
}

pub async fn run_server(state: Arc<AppState>) -> Result<(), WatchlistError> {
    let bind_addr = state.config.bind_addr.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| WatchlistError::Config(format!("failed to bind {bind_addr}: {e}")))?;
    info!("API server listening on {bind_addr}");
    axum::serve(listener, app)
        .await
        .map_err(|e| WatchlistError::Config(format!("server error: {e}")))
}

fn error_response(err: WatchlistError) -> axum::response::Response {
    let status = match &err {
        WatchlistError::Validation { .. } => StatusCode::BAD_REQUEST,
        WatchlistError::NotFound { .. } => StatusCode::NOT_FOUND,
        WatchlistError::Provider(_) => StatusCode::BAD_GATEWAY,
        WatchlistError::Persistence(_) | WatchlistError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        error!("request failed: {err}");
    }
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

fn bad_request(message: String) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

async fn get_watchlist(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.snapshot().await)
}

#[derive(Deserialize)]
struct AddStockBody {
    symbol: String,
    category: String,
    rank: String,
}

async fn add_stock(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddStockBody>,
) -> axum::response::Response {
    let Some(category) = Category::parse(&body.category) else {
        return bad_request(format!(
            "unknown category '{}' (expected Active|Watching)",
            body.category
        ));
    };
    let Some(rank) = Rank::parse(&body.rank) else {
        return bad_request(format!(
            "unknown rank '{}' (expected Cold|Hot|Very Hot)",
            body.rank
        ));
    };

    match state.engine.add_stock(&body.symbol, category, rank).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn remove_stock(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> axum::response::Response {
    match state.engine.remove_stock(&symbol).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Deserialize)]
struct RecategorizeBody {
    category: String,
}

async fn recategorize(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Json(body): Json<RecategorizeBody>,
) -> axum::response::Response {
    let Some(category) = Category::parse(&body.category) else {
        return bad_request(format!(
            "unknown category '{}' (expected Active|Watching)",
            body.category
        ));
    };

    match state.engine.recategorize(&symbol, category).await {
        Ok(record) => Json(record).into_response(),
        Err(err) => error_response(err),
    }
}

/// On-demand quote for any symbol, tracked or not (details view).
async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> axum::response::Response {
    match state.engine.lookup_quote(&symbol).await {
        Ok(quote) => Json(quote).into_response(),
        Err(err) => error_response(err),
    }
}

async fn refresh(State(state): State<Arc<AppState>>) -> axum::response::Response {
    match state.engine.refresh_all().await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => error_response(err),
    }
}
