//! Load-once dataset cache
//!
//! The prepared dataset is read from disk on first use and shared read-only
//! afterwards. Load failures are not cached, so a later call retries.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::DashboardError;
use crate::prepare::PreparedDataset;

pub struct DatasetCache {
    path: PathBuf,
    dataset: RwLock<Option<Arc<PreparedDataset>>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: RwLock::new(None),
        }
    }

    /// A cache that already holds `dataset`; nothing is read from disk.
    pub fn preloaded(path: impl Into<PathBuf>, dataset: PreparedDataset) -> Self {
        Self {
            path: path.into(),
            dataset: RwLock::new(Some(Arc::new(dataset))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn is_loaded(&self) -> bool {
        self.dataset.read().await.is_some()
    }

    pub async fn get_or_load(&self) -> Result<Arc<PreparedDataset>, DashboardError> {
        // Check cache first
        {
            let cache = self.dataset.read().await;
            if let Some(dataset) = cache.as_ref() {
                return Ok(Arc::clone(dataset));
            }
        }

        let mut cache = self.dataset.write().await;
        // Another task may have loaded while we waited for the write lock
        if let Some(dataset) = cache.as_ref() {
            return Ok(Arc::clone(dataset));
        }

        info!("Loading dataset from {:?}", self.path);
        // CSV parsing blocks; keep it off the async workers
        let path = self.path.clone();
        let dataset = tokio::task::spawn_blocking(move || crate::load_prepared(&path)).await??;
        let dataset = Arc::new(dataset);
        *cache = Some(Arc::clone(&dataset));
        Ok(dataset)
    }
}
