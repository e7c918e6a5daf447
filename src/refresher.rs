//! Background quote refresher.
//!
//! Polls the quote provider on a fixed interval and merges results through
//! the engine. Background refresh failures are logged, never fatal; the
//! previous in-memory state stays displayable.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use crate::engine::{RefreshOutcome, WatchlistEngine};

pub struct Refresher {
    engine: Arc<WatchlistEngine>,
    interval_secs: u64,
}

impl Refresher {
    pub fn new(engine: Arc<WatchlistEngine>, interval_secs: u64) -> Self {
        Self {
            engine,
            interval_secs,
        }
    }

    pub fn start(&self) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let interval = self.interval_secs;

        tokio::spawn(async move {
            info!("👁️  Refresher started (every {interval}s)");
            loop {
                sleep(Duration::from_secs(interval)).await;
                match engine.refresh_all().await {
                    Ok(RefreshOutcome::Applied { updated }) => {
                        info!(updated, "[REFRESHER] quotes merged");
                    }
                    Ok(RefreshOutcome::Stale) => {
                        info!("[REFRESHER] result superseded by a newer refresh");
                    }
                    Err(e) => {
                        error!("[REFRESHER] refresh failed: {e}");
                    }
                }
            }
        })
    }
}
