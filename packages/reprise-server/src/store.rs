//! Catalogue storage: in-memory state behind a lock, flushed to a JSON snapshot.

use crate::catalog::{Catalog, CatalogSnapshot};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info};

/// JSON file holding a [`CatalogSnapshot`].
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Write the snapshot atomically.
    pub fn save(&self, snapshot: &CatalogSnapshot) -> Result<(), crate::Error> {
        let data = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| crate::Error::Storage(format!("Failed to serialize snapshot: {e}")))?;

        // Atomic write: tmp + rename
        let tmp = self.path.with_extension("tmp");
        if let Some(parent) = tmp.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    crate::Error::Storage(format!("Failed to create data dir: {e}"))
                })?;
            }
        }
        std::fs::write(&tmp, &data)
            .map_err(|e| crate::Error::Storage(format!("Failed to write snapshot: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| crate::Error::Storage(format!("Failed to rename snapshot: {e}")))?;

        info!(
            path = %self.path.display(),
            orders = snapshot.orders.len(),
            "Snapshot saved"
        );
        Ok(())
    }

    /// Load the snapshot. A missing file yields an empty catalogue.
    pub fn load(&self) -> Result<CatalogSnapshot, crate::Error> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No snapshot found, starting empty");
            return Ok(CatalogSnapshot::default());
        }
        let data = std::fs::read(&self.path)
            .map_err(|e| crate::Error::Storage(format!("Failed to read snapshot: {e}")))?;
        let snapshot: CatalogSnapshot = serde_json::from_slice(&data)
            .map_err(|e| crate::Error::Storage(format!("Invalid snapshot: {e}")))?;
        info!(
            users = snapshot.users.len(),
            offers = snapshot.offers.len(),
            addresses = snapshot.addresses.len(),
            orders = snapshot.orders.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }
}

/// Shared catalogue with dirty tracking for background flushes.
pub struct MarketStore {
    catalog: RwLock<Catalog>,
    dirty: AtomicBool,
    snapshots: Option<SnapshotStore>,
}

impl MarketStore {
    /// In-memory only store.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
            dirty: AtomicBool::new(false),
            snapshots: None,
        }
    }

    /// Store backed by a snapshot file; loads the current contents.
    pub fn open(path: PathBuf) -> Result<Self, crate::Error> {
        let snapshots = SnapshotStore::new(path);
        let catalog = Catalog::from(snapshots.load()?);
        Ok(Self {
            catalog: RwLock::new(catalog),
            dirty: AtomicBool::new(false),
            snapshots: Some(snapshots),
        })
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, Catalog>, crate::Error> {
        self.catalog
            .read()
            .map_err(|_| crate::Error::Storage("catalog lock poisoned".into()))
    }

    /// Run `f` under the write lock. Successful mutations mark the store dirty.
    pub fn mutate<T, E>(
        &self,
        f: impl FnOnce(&mut Catalog) -> Result<T, E>,
    ) -> Result<T, crate::Error>
    where
        crate::Error: From<E>,
    {
        let mut catalog = self
            .catalog
            .write()
            .map_err(|_| crate::Error::Storage("catalog lock poisoned".into()))?;
        let value = f(&mut catalog)?;
        self.dirty.store(true, Ordering::Release);
        Ok(value)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Flush to disk if anything changed since the last flush.
    ///
    /// Returns `true` when a snapshot was written.
    pub fn persist(&self) -> Result<bool, crate::Error> {
        let Some(snapshots) = &self.snapshots else {
            return Ok(false);
        };
        if !self.dirty.swap(false, Ordering::AcqRel) {
            debug!("Catalog clean, skipping snapshot");
            return Ok(false);
        }
        let snapshot = self.read()?.to_snapshot();
        if let Err(e) = snapshots.save(&snapshot) {
            // Keep the flag so the next tick retries.
            self.dirty.store(true, Ordering::Release);
            return Err(e);
        }
        Ok(true)
    }
}
