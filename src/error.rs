//! Custom error types for the watchlist system
//!
//! Provides structured, typed errors instead of generic Box<dyn Error>

use thiserror::Error;

/// Top-level watchlist errors, returned by every engine operation.
#[derive(Error, Debug)]
pub enum WatchlistError {
    #[error("Invalid symbol: '{input}' (must be non-empty after trimming)")]
    Validation { input: String },

    #[error("Symbol not found: {symbol}")]
    NotFound { symbol: String },

    #[error("Quote provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Quote-provider errors. A failure covers the whole batch; there is no
/// partial-success signaling in the provider contract.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Provider misconfigured: {reason}")]
    Misconfigured { reason: String },
}

/// Watchlist store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt store file {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

impl WatchlistError {
    pub fn validation(input: impl Into<String>) -> Self {
        Self::Validation {
            input: input.into(),
        }
    }

    pub fn not_found(symbol: impl Into<String>) -> Self {
        Self::NotFound {
            symbol: symbol.into(),
        }
    }
}
