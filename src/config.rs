//! Shared command-line configuration for the dashboard binaries.

use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "olist_cleaned_dataset.csv";
pub const DEFAULT_HISTOGRAM_BINS: usize = 40;
pub const DEFAULT_TOP_CATEGORIES: usize = 10;

/// Log filter for the API server when `RUST_LOG` is unset.
pub const SERVER_LOG_FILTER: &str = "info";
/// The terminal report prints charts on stdout, so only warnings are logged by default.
pub const REPORT_LOG_FILTER: &str = "warn";

/// `RUST_LOG` if set and valid, otherwise `default`.
pub fn log_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
}

/// Dataset and view settings, flattened into each binary's arguments.
#[derive(Args, Debug, Clone)]
pub struct DashboardConfig {
    /// Path to the cleaned order-item CSV
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Number of bins in the delivery-time histogram
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    pub histogram_bins: usize,

    /// Number of product categories in the top-N revenue view
    #[arg(long, default_value_t = DEFAULT_TOP_CATEGORIES)]
    pub top_categories: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            top_categories: DEFAULT_TOP_CATEGORIES,
        }
    }
}

impl DashboardConfig {
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            histogram_bins: self.histogram_bins.max(1),
            top_categories: self.top_categories,
        }
    }
}

/// Knobs consumed by the aggregation views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub histogram_bins: usize,
    pub top_categories: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            top_categories: DEFAULT_TOP_CATEGORIES,
        }
    }
}
