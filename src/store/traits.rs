use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::WatchlistEntry;

/// Durable keyed storage of `(symbol, category, rank)` triples.
///
/// Injected into the engine as `Arc<dyn WatchlistStore>` so tests can swap
/// in doubles. `list_all` order must be stable across calls absent mutation;
/// it is what the engine uses as display order on load.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Insert or update, keyed by symbol.
    async fn upsert(&self, entry: &WatchlistEntry) -> Result<(), StoreError>;

    /// All persisted entries in stable (insertion) order.
    async fn list_all(&self) -> Result<Vec<WatchlistEntry>, StoreError>;

    /// Idempotent removal: deleting a missing key is not an error.
    async fn delete(&self, symbol: &str) -> Result<(), StoreError>;
}
