//! Process-lifetime memoization of snapshot loads.
//!
//! The cache key is the identity of the source snapshot: canonical path plus
//! file size and modified time. Repeated facet changes hit the cache; a
//! replaced file on disk gets a new key and is loaded fresh.

use metrics::{counter, gauge};
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::SystemTime,
};
use tracing::debug;

use super::{loader, ReviewStore};
use crate::error::{DashboardError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SnapshotKey {
    pub fn of(path: &Path) -> Result<Self> {
        let load_err = |e: std::io::Error| DashboardError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
            hint: "check REVIEWS_DATA_PATH or data_path in config/dashboard.toml".into(),
        };
        let meta = fs::metadata(path).map_err(load_err)?;
        let canonical = fs::canonicalize(path).map_err(load_err)?;
        Ok(Self {
            path: canonical,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug, Default)]
pub struct StoreCache {
    inner: RwLock<HashMap<SnapshotKey, Arc<ReviewStore>>>,
}

impl StoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized store for this snapshot, loading it on first use.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<ReviewStore>> {
        let key = SnapshotKey::of(path)?;

        // Fast path under the read lock.
        if let Some(hit) = self.inner.read().expect("store cache poisoned").get(&key) {
            counter!("store_cache_hits_total").increment(1);
            debug!(path = %key.path.display(), "store cache hit");
            return Ok(Arc::clone(hit));
        }

        let mut guard = self.inner.write().expect("store cache poisoned");
        // Double-check in case another caller loaded it meanwhile.
        if let Some(hit) = guard.get(&key) {
            counter!("store_cache_hits_total").increment(1);
            return Ok(Arc::clone(hit));
        }

        let store = Arc::new(loader::load_csv(path)?);
        counter!("store_loads_total").increment(1);
        gauge!("store_reviews").set(store.len() as f64);

        // An older snapshot of the same file is dead weight now.
        guard.retain(|k, _| k.path != key.path);
        guard.insert(key, Arc::clone(&store));
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("store cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static GLOBAL: Lazy<StoreCache> = Lazy::new(StoreCache::new);

/// Load through the process-wide cache.
pub fn load_cached(path: &Path) -> Result<Arc<ReviewStore>> {
    GLOBAL.get_or_load(path)
}
