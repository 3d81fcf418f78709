//! Olist e-commerce dashboard
//!
//! Loads a cleaned order-item dataset, prepares it once and serves the six
//! descriptive views of the dashboard, filterable by purchase year.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod histogram;
pub mod loader;
pub mod models;
pub mod prepare;
pub mod render;
pub mod views;

pub use cache::DatasetCache;
pub use config::{DashboardConfig, ViewOptions};
pub use error::DashboardError;
pub use filter::{FilteredTable, YearSelection};
pub use models::{OrderRecord, YearMonth};
pub use prepare::{PreparationReport, PreparedDataset};
pub use views::{DashboardViews, ViewName};

/// Load the CSV at `path` and run data preparation on it.
pub fn load_prepared(path: impl AsRef<std::path::Path>) -> Result<PreparedDataset, DashboardError> {
    let raw = loader::load_table(path.as_ref())?;
    Ok(prepare::prepare(raw))
}
