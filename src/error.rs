use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the dashboard pipeline and its request surface.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The dataset file does not exist. Fatal: nothing is rendered.
    #[error("File '{}' not found.", path.display())]
    DatasetNotFound { path: PathBuf },

    #[error("Failed to read dataset '{}': {source}", path.display())]
    DatasetUnreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Dataset load did not complete: {0}")]
    LoadAborted(#[from] tokio::task::JoinError),

    #[error("Invalid year '{0}': expected 'all' or a calendar year")]
    InvalidYear(String),

    #[error("Invalid limit '{0}': expected a non-negative row count")]
    InvalidLimit(String),

    #[error("Unknown view '{0}'")]
    UnknownView(String),
}

impl DashboardError {
    /// True for load failures that must halt the dashboard.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DashboardError::DatasetNotFound { .. }
                | DashboardError::DatasetUnreadable { .. }
                | DashboardError::LoadAborted(_)
        )
    }
}
