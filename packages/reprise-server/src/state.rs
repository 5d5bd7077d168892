//! Application state shared across handlers.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::store::MarketStore;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::time::Instant;
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: MarketStore,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create state from configuration, loading the snapshot when persistence
    /// is enabled.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        let store = if config.persistence_enabled() {
            let path = PathBuf::from(config.data_path.trim());
            info!(path = %path.display(), "Opening catalog snapshot");
            MarketStore::open(path)?
        } else {
            info!("Persistence disabled, catalog is in-memory only");
            MarketStore::new(Catalog::default())
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: MarketStore) -> Self {
        Self {
            config,
            store,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Milliseconds since the Unix epoch.
    pub fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}
