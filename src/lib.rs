//! stockwatch - personal stock watchlist manager
//!
//! Tracks ticker symbols under two categories (Active / Watching) with a
//! user-assigned heat rank, and reconciles that user-owned metadata against
//! live quote data fetched from a provider. The merge engine never loses
//! user intent when market data is missing, stale, or erroring.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod provider;
pub mod refresher;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use engine::{RefreshOutcome, WatchlistEngine};
pub use error::{ProviderError, StoreError, WatchlistError};
pub use model::{Category, MarketData, Rank, StockQuote, StockRecord, WatchlistEntry, WatchlistSnapshot};
