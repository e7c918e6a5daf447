use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;

use crate::error::StoreError;
use crate::model::WatchlistEntry;

use super::traits::WatchlistStore;

/// In-memory store: DashMap keyed by symbol plus an insertion-order index
/// so `list_all` stays stable. Used by tests and by ephemeral runs with no
/// `store_path` configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, WatchlistEntry>,
    order: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store; handy in tests.
    pub fn with_entries(entries: Vec<WatchlistEntry>) -> Self {
        let store = Self::new();
        {
            let mut order = store.order.lock().unwrap();
            for entry in entries {
                order.push(entry.symbol.clone());
                store.entries.insert(entry.symbol.clone(), entry);
            }
        }
        store
    }
}

#[async_trait]
impl WatchlistStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn upsert(&self, entry: &WatchlistEntry) -> Result<(), StoreError> {
        let mut order = self.order.lock().unwrap();
        if !order.iter().any(|s| s == &entry.symbol) {
            order.push(entry.symbol.clone());
        }
        self.entries.insert(entry.symbol.clone(), entry.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<WatchlistEntry>, StoreError> {
        let order = self.order.lock().unwrap();
        Ok(order
            .iter()
            .filter_map(|symbol| self.entries.get(symbol).map(|e| e.value().clone()))
            .collect())
    }

    async fn delete(&self, symbol: &str) -> Result<(), StoreError> {
        let mut order = self.order.lock().unwrap();
        order.retain(|s| s != symbol);
        self.entries.remove(symbol);
        Ok(())
    }
}
