//! Dashboard business logic shared by the REST handlers
//!
//! Every call filters the cached dataset and recomputes from scratch.

use std::sync::Arc;
use tracing::debug;

use crate::cache::DatasetCache;
use crate::config::ViewOptions;
use crate::error::DashboardError;
use crate::filter::{year_options, FilteredTable, YearSelection};
use crate::prepare::PreparedDataset;
use crate::views::{compute_view, DashboardViews, ViewData, ViewName};

pub type ServiceResult<T> = Result<T, DashboardError>;

pub struct DashboardService {
    cache: DatasetCache,
    options: ViewOptions,
}

impl DashboardService {
    pub fn new(cache: DatasetCache, options: ViewOptions) -> Self {
        Self { cache, options }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// The prepared, unfiltered dataset.
    pub async fn dataset(&self) -> ServiceResult<Arc<PreparedDataset>> {
        self.cache.get_or_load().await
    }

    pub async fn year_options(&self) -> ServiceResult<Vec<YearSelection>> {
        let dataset = self.dataset().await?;
        Ok(year_options(&dataset))
    }

    pub async fn dashboard(&self, selection: YearSelection) -> ServiceResult<DashboardViews> {
        let dataset = self.dataset().await?;
        let table = FilteredTable::new(&dataset, selection);
        Ok(DashboardViews::compute(&table, &self.options))
    }

    pub async fn view(&self, name: ViewName, selection: YearSelection) -> ServiceResult<ViewData> {
        let dataset = self.dataset().await?;
        let table = FilteredTable::new(&dataset, selection);
        debug!("Computing {} for {} ({} rows)", name, selection, table.len());
        Ok(compute_view(&table, name, &self.options))
    }
}
