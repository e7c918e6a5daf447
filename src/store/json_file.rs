use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use crate::error::StoreError;
use crate::model::{Category, Rank, WatchlistEntry};

use super::traits::WatchlistStore;

/// Raw on-disk shape. Rank and category are stored as strings so a
/// hand-edited file degrades to a warning instead of a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawEntry {
    symbol: String,
    category: String,
    rank: String,
}

impl RawEntry {
    fn from_entry(entry: &WatchlistEntry) -> Self {
        Self {
            symbol: entry.symbol.clone(),
            category: entry.category.label().to_string(),
            rank: entry.rank.label().to_string(),
        }
    }

    /// Normalize unknown labels at the read boundary: the core only ever
    /// sees the closed enums. Unknown values are a data-integrity problem,
    /// reported via `warn!` and mapped to the defensive defaults.
    fn into_entry(self) -> WatchlistEntry {
        let category = Category::parse(&self.category).unwrap_or_else(|| {
            warn!(
                symbol = %self.symbol,
                value = %self.category,
                "unknown category in store, defaulting to Watching"
            );
            Category::Watching
        });
        let rank = Rank::parse(&self.rank).unwrap_or_else(|| {
            warn!(
                symbol = %self.symbol,
                value = %self.rank,
                "unknown rank in store, defaulting to Cold"
            );
            Rank::Cold
        });
        WatchlistEntry {
            symbol: self.symbol,
            category,
            rank,
        }
    }
}

/// JSON-file-backed watchlist store. The whole list is small (a personal
/// watchlist), so every mutation rewrites the file via temp-file + rename.
/// Entries keep insertion order, which `list_all` preserves.
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    fn read_raw(&self) -> Result<Vec<RawEntry>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path_str(),
            source,
        })?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
            path: self.path_str(),
            reason: e.to_string(),
        })
    }

    fn write_raw(&self, entries: &[RawEntry]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }
        let text = serde_json::to_string_pretty(entries).map_err(|e| StoreError::Corrupt {
            path: self.path_str(),
            reason: e.to_string(),
        })?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, text).map_err(|source| StoreError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path_str(),
            source,
        })
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

#[async_trait]
impl WatchlistStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json_file"
    }

    async fn upsert(&self, entry: &WatchlistEntry) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap();
        let mut entries = self.read_raw()?;
        let raw = RawEntry::from_entry(entry);
        if let Some(existing) = entries.iter_mut().find(|e| e.symbol == entry.symbol) {
            *existing = raw;
        } else {
            entries.push(raw);
        }
        self.write_raw(&entries)
    }

    async fn list_all(&self) -> Result<Vec<WatchlistEntry>, StoreError> {
        let _guard = self.lock.lock().unwrap();
        let entries = self.read_raw()?;
        Ok(entries.into_iter().map(RawEntry::into_entry).collect())
    }

    async fn delete(&self, symbol: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap();
        let mut entries = self.read_raw()?;
        let before = entries.len();
        entries.retain(|e| e.symbol != symbol);
        if entries.len() == before {
            // Nothing to remove; keep the file untouched.
            return Ok(());
        }
        self.write_raw(&entries)
    }
}
