//! Watchlist synchronization and merge engine.
//!
//! Owns the two ordered category lists and reconciles user-owned metadata
//! (category, rank) with asynchronously fetched market data. User intent is
//! never lost: a quote merge replaces market-sourced fields only, in place,
//! and a failed or stale fetch leaves the lists untouched.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::WatchlistError;
use crate::model::{
    normalize_symbol, Category, MarketData, Rank, StockQuote, StockRecord, WatchlistEntry,
    WatchlistSnapshot,
};
use crate::provider::QuoteProvider;
use crate::store::WatchlistStore;

/// Result of a refresh call. A stale result (a newer refresh was issued
/// while this one was in flight) is discarded, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    Applied { updated: usize },
    Stale,
}

#[derive(Debug, Default)]
struct WatchlistState {
    active: Vec<StockRecord>,
    watching: Vec<StockRecord>,
}

impl WatchlistState {
    fn list_mut(&mut self, category: Category) -> &mut Vec<StockRecord> {
        match category {
            Category::Active => &mut self.active,
            Category::Watching => &mut self.watching,
        }
    }

    fn find_mut(&mut self, symbol: &str) -> Option<&mut StockRecord> {
        self.active
            .iter_mut()
            .chain(self.watching.iter_mut())
            .find(|r| r.symbol == symbol)
    }

    fn find(&self, symbol: &str) -> Option<&StockRecord> {
        self.active
            .iter()
            .chain(self.watching.iter())
            .find(|r| r.symbol == symbol)
    }

    /// Remove the record from whichever list holds it.
    fn take(&mut self, symbol: &str) -> Option<StockRecord> {
        if let Some(pos) = self.active.iter().position(|r| r.symbol == symbol) {
            return Some(self.active.remove(pos));
        }
        if let Some(pos) = self.watching.iter().position(|r| r.symbol == symbol) {
            return Some(self.watching.remove(pos));
        }
        None
    }

    fn symbols(&self) -> Vec<String> {
        self.active
            .iter()
            .chain(self.watching.iter())
            .map(|r| r.symbol.clone())
            .collect()
    }

    fn snapshot(&self) -> WatchlistSnapshot {
        WatchlistSnapshot {
            active: self.active.clone(),
            watching: self.watching.clone(),
        }
    }
}

/// The engine. All mutating operations hold the state lock across
/// persist + memory update, so store and memory agree in submission order.
/// Quote fetches happen outside the lock; a refresh only takes the lock to
/// apply its result, and only if it is still the latest issued.
pub struct WatchlistEngine {
    store: Arc<dyn WatchlistStore>,
    provider: Arc<dyn QuoteProvider>,
    state: Mutex<WatchlistState>,
    // Sequence number of the most recently issued refresh.
    refresh_seq: AtomicU64,
}

impl WatchlistEngine {
    pub fn new(store: Arc<dyn WatchlistStore>, provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            store,
            provider,
            state: Mutex::new(WatchlistState::default()),
            refresh_seq: AtomicU64::new(0),
        }
    }

    /// Replace in-memory state from the store. Does not contact the quote
    /// provider; every record starts with market fields unset. Safe to call
    /// again (re-load discards in-memory state, which every mutating
    /// operation persists synchronously anyway).
    pub async fn load(&self) -> Result<usize, WatchlistError> {
        let entries = self.store.list_all().await?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut fresh = WatchlistState::default();
        for entry in entries {
            if !seen.insert(entry.symbol.clone()) {
                warn!(symbol = %entry.symbol, "duplicate symbol in store, keeping first");
                continue;
            }
            let record = StockRecord::unfetched(entry.symbol, entry.category, entry.rank);
            fresh.list_mut(record.category).push(record);
        }

        let loaded = fresh.active.len() + fresh.watching.len();
        let mut state = self.state.lock().await;
        *state = fresh;
        info!(
            active = state.active.len(),
            watching = state.watching.len(),
            "watchlist loaded from {}",
            self.store.name()
        );
        Ok(loaded)
    }

    /// Fetch quotes for `symbols` in one provider batch and merge them into
    /// matching records in place, preserving position, category and rank.
    ///
    /// Quotes for untracked symbols are ignored; tracked symbols missing
    /// from the response keep whatever was previously known. On provider
    /// failure nothing is mutated. A result that is no longer the latest
    /// issued refresh is discarded (`RefreshOutcome::Stale`).
    pub async fn refresh(&self, symbols: Vec<String>) -> Result<RefreshOutcome, WatchlistError> {
        let mut batch: Vec<String> = Vec::with_capacity(symbols.len());
        let mut seen: HashSet<String> = HashSet::new();
        for symbol in symbols {
            if let Some(normalized) = normalize_symbol(&symbol) {
                if seen.insert(normalized.clone()) {
                    batch.push(normalized);
                }
            }
        }
        if batch.is_empty() {
            return Ok(RefreshOutcome::Applied { updated: 0 });
        }

        let ticket = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let quotes = self.provider.fetch_quotes(&batch).await?;

        let mut state = self.state.lock().await;
        if ticket != self.refresh_seq.load(Ordering::SeqCst) {
            info!(ticket, "discarding stale refresh result");
            return Ok(RefreshOutcome::Stale);
        }

        let mut updated = 0;
        for quote in &quotes {
            let Some(symbol) = normalize_symbol(&quote.symbol) else {
                continue;
            };
            match state.find_mut(&symbol) {
                Some(record) => {
                    record.apply_quote(quote);
                    updated += 1;
                }
                None => {
                    // Refresh must never introduce new records.
                    warn!(symbol = %symbol, "provider returned quote for untracked symbol, ignoring");
                }
            }
        }
        info!(
            requested = batch.len(),
            returned = quotes.len(),
            updated, "🔄 [ENGINE] refresh merged"
        );
        Ok(RefreshOutcome::Applied { updated })
    }

    /// Refresh every currently tracked symbol.
    pub async fn refresh_all(&self) -> Result<RefreshOutcome, WatchlistError> {
        let symbols = {
            let state = self.state.lock().await;
            state.symbols()
        };
        self.refresh(symbols).await
    }

    /// Add a symbol with the caller's category and rank. Fetches an initial
    /// quote as part of the operation; nothing is persisted or inserted if
    /// validation, the fetch, or persistence fails. Re-adding an existing
    /// symbol is an upsert: the old entry leaves its list and the new one
    /// (fresh market data, caller's category/rank) is appended to the
    /// target list.
    pub async fn add_stock(
        &self,
        symbol: &str,
        category: Category,
        rank: Rank,
    ) -> Result<StockRecord, WatchlistError> {
        let normalized =
            normalize_symbol(symbol).ok_or_else(|| WatchlistError::validation(symbol))?;

        let quotes = self.provider.fetch_quotes(&[normalized.clone()]).await?;
        let quote = quotes
            .iter()
            .find(|q| normalize_symbol(&q.symbol).as_deref() == Some(normalized.as_str()))
            .ok_or_else(|| WatchlistError::not_found(&normalized))?;

        let record = StockRecord {
            symbol: normalized.clone(),
            category,
            rank,
            market: MarketData::from_quote(quote),
        };

        let mut state = self.state.lock().await;
        self.store
            .upsert(&WatchlistEntry::new(normalized.as_str(), category, rank))
            .await?;
        if state.take(&normalized).is_some() {
            info!(symbol = %normalized, "re-added existing symbol, moving to {}", category);
        }
        state.list_mut(category).push(record.clone());
        info!(symbol = %normalized, %category, %rank, "➕ [ENGINE] stock added");
        Ok(record)
    }

    /// Remove a symbol. Idempotent: an untracked symbol is still deleted
    /// from the store and reported as success. The delete is persisted
    /// before memory is touched, so a crash in between cannot resurrect
    /// the entry on the next load.
    pub async fn remove_stock(&self, symbol: &str) -> Result<(), WatchlistError> {
        let normalized =
            normalize_symbol(symbol).ok_or_else(|| WatchlistError::validation(symbol))?;

        let mut state = self.state.lock().await;
        self.store.delete(&normalized).await?;
        if state.take(&normalized).is_some() {
            info!(symbol = %normalized, "➖ [ENGINE] stock removed");
        }
        Ok(())
    }

    /// Move a symbol to the other category, keeping its rank and market
    /// data. The record is appended to the end of the destination list.
    /// No-op when the symbol is already in `new_category`.
    pub async fn recategorize(
        &self,
        symbol: &str,
        new_category: Category,
    ) -> Result<StockRecord, WatchlistError> {
        let normalized =
            normalize_symbol(symbol).ok_or_else(|| WatchlistError::validation(symbol))?;

        let mut state = self.state.lock().await;
        let current = state
            .find(&normalized)
            .ok_or_else(|| WatchlistError::not_found(&normalized))?;

        if current.category == new_category {
            return Ok(current.clone());
        }
        let rank = current.rank;

        self.store
            .upsert(&WatchlistEntry::new(normalized.as_str(), new_category, rank))
            .await?;

        // take() cannot fail here: the lock has been held since find().
        let mut record = match state.take(&normalized) {
            Some(record) => record,
            None => return Err(WatchlistError::not_found(&normalized)),
        };
        record.category = new_category;
        state.list_mut(new_category).push(record.clone());
        info!(symbol = %normalized, %new_category, "↔️ [ENGINE] stock recategorized");
        Ok(record)
    }

    /// One-off quote fetch for any symbol, tracked or not, backing the
    /// details view. Read-only: state, store and the refresh sequence are
    /// untouched.
    pub async fn lookup_quote(&self, symbol: &str) -> Result<StockQuote, WatchlistError> {
        let normalized =
            normalize_symbol(symbol).ok_or_else(|| WatchlistError::validation(symbol))?;
        let quotes = self.provider.fetch_quotes(&[normalized.clone()]).await?;
        quotes
            .into_iter()
            .find(|q| normalize_symbol(&q.symbol).as_deref() == Some(normalized.as_str()))
            .ok_or_else(|| WatchlistError::not_found(&normalized))
    }

    /// Read-only projection for the display layer.
    pub async fn snapshot(&self) -> WatchlistSnapshot {
        let state = self.state.lock().await;
        state.snapshot()
    }
}
